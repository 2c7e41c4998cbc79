//! Polynomial evaluation and interpolation over GF(251)
//!
//! Coefficients are stored lowest degree first, so `coefficients[i]`
//! multiplies `x^i`.

use crate::error::{Result, ShadowError};
use crate::finite_field::FiniteField;

/// Evaluates `Σ coefficients[i] · x^i` at `x`.
///
/// Raw coefficient bytes are reduced into the field as they are consumed.
///
/// # Example
/// ```
/// use shadow_share::{FiniteField, polynomial};
///
/// // 10 + 20x + 30x^2 at x = 2
/// let y = polynomial::evaluate(&[10, 20, 30], FiniteField::new(2));
/// assert_eq!(y.value(), 170);
/// ```
#[inline]
pub fn evaluate(coefficients: &[u8], x: FiniteField) -> FiniteField {
    // Horner's method, highest degree first
    coefficients
        .iter()
        .rev()
        .fold(FiniteField::ZERO, |acc, &coeff| {
            acc * x + FiniteField::new(coeff)
        })
}

/// Recovers the unique polynomial of degree `points.len() - 1` passing
/// through every `(x, y)` point, using Lagrange interpolation.
///
/// # Errors
/// Returns [`ShadowError::DuplicatePoint`] if two points share an x
/// coordinate.
///
/// # Example
/// ```
/// use shadow_share::{FiniteField, polynomial};
///
/// let coefficients = [7u8, 3, 200];
/// let points: Vec<_> = [1u8, 4, 9]
///     .iter()
///     .map(|&x| {
///         let x = FiniteField::new(x);
///         (x, polynomial::evaluate(&coefficients, x))
///     })
///     .collect();
///
/// let recovered = polynomial::interpolate(&points).unwrap();
/// let recovered: Vec<u8> = recovered.iter().map(|c| c.value()).collect();
/// assert_eq!(recovered, coefficients);
/// ```
pub fn interpolate(points: &[(FiniteField, FiniteField)]) -> Result<Vec<FiniteField>> {
    let degree_bound = points.len();
    let mut result = vec![FiniteField::ZERO; degree_bound];

    for (i, &(x_i, y_i)) in points.iter().enumerate() {
        // Numerator Π_{j≠i} (x - x_j), built up one linear factor at a time
        let mut basis = vec![FiniteField::ZERO; degree_bound];
        basis[0] = FiniteField::ONE;
        let mut basis_degree = 0;
        let mut denominator = FiniteField::ONE;

        for (j, &(x_j, _)) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            if x_i == x_j {
                return Err(ShadowError::DuplicatePoint);
            }

            basis_degree += 1;
            for d in (1..=basis_degree).rev() {
                basis[d] = basis[d - 1] - x_j * basis[d];
            }
            basis[0] = -(x_j * basis[0]);

            denominator = denominator * (x_i - x_j);
        }

        let scale = y_i * denominator.inverse().ok_or(ShadowError::DuplicatePoint)?;
        for (acc, &term) in result.iter_mut().zip(&basis) {
            *acc = *acc + scale * term;
        }
    }

    Ok(result)
}
