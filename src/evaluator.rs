//! Share evaluation
//!
//! Turns the coefficient vectors of every block into one share stream per
//! shadow by evaluating both block polynomials at the shadow's identity.

use rayon::prelude::*;
#[cfg(feature = "zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::SplitMode;
use crate::finite_field::FiniteField;
use crate::polynomial;
use crate::splitter::CoefficientVectors;

/// The share stream of a single shadow
///
/// Holds two field elements per block, `P_A(x)` followed by `P_B(x)`, where
/// `x` is the shadow number.
///
/// # Example
/// ```
/// use shadow_share::{ShadowGenerator, Config};
///
/// let mut generator = ShadowGenerator::builder(5, 3)
///     .with_config(Config::new().with_seed(7))
///     .build()
///     .unwrap();
/// let shadows = generator.generate_shadows(&[10, 20, 30, 40]).unwrap();
///
/// assert_eq!(shadows.len(), 5);
/// assert_eq!(shadows[0].number, 1);
/// assert_eq!(shadows[0].points.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "zeroize", derive(Zeroize, ZeroizeOnDrop))]
pub struct Shadow {
    /// Shadow identity, also the polynomial evaluation point
    pub number: u8,
    /// Share bytes, each a canonical field element
    pub points: Vec<u8>,
}

impl Shadow {
    /// Number of blocks this shadow covers
    #[inline]
    pub fn block_count(&self) -> usize {
        self.points.len() / 2
    }

    /// The `(P_A(x), P_B(x))` pair for one block
    #[inline]
    pub fn block_points(&self, block: usize) -> Option<(u8, u8)> {
        let a = *self.points.get(2 * block)?;
        let b = *self.points.get(2 * block + 1)?;
        Some((a, b))
    }
}

/// Evaluation point for shadow `number`; a number reducing to zero is
/// evaluated at one instead.
#[inline]
pub fn evaluation_point(number: u8) -> FiniteField {
    FiniteField::new(number).nonzero_or_one()
}

/// Evaluates every block at one shadow's identity
pub fn evaluate_shadow(blocks: &[CoefficientVectors], number: u8) -> Shadow {
    let x = evaluation_point(number);
    let mut points = Vec::with_capacity(blocks.len() * 2);
    for block in blocks {
        points.push(polynomial::evaluate(&block.a, x).value());
        points.push(polynomial::evaluate(&block.b, x).value());
    }
    Shadow { number, points }
}

/// Evaluates every block for shadows `1..=total_shadows`
///
/// Shadows share no mutable state, so [`SplitMode::Parallel`] spreads them
/// across the rayon pool. Output order is always by shadow number.
pub fn evaluate_shadows(
    blocks: &[CoefficientVectors],
    total_shadows: u8,
    mode: SplitMode,
) -> Vec<Shadow> {
    match mode {
        SplitMode::Sequential => (1..=total_shadows)
            .map(|number| evaluate_shadow(blocks, number))
            .collect(),
        SplitMode::Parallel => (1..=total_shadows)
            .into_par_iter()
            .map(|number| evaluate_shadow(blocks, number))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::interpolate;

    fn sample_blocks() -> Vec<CoefficientVectors> {
        vec![
            CoefficientVectors::from_block(&[10, 20, 30, 40], 3, FiniteField::new(17)),
            CoefficientVectors::from_block(&[255, 0, 251, 7], 3, FiniteField::new(250)),
        ]
    }

    #[test]
    fn test_stream_layout() {
        let blocks = sample_blocks();
        let shadow = evaluate_shadow(&blocks, 2);
        assert_eq!(shadow.number, 2);
        assert_eq!(shadow.block_count(), 2);

        let x = FiniteField::new(2);
        assert_eq!(
            shadow.block_points(0),
            Some((
                polynomial::evaluate(&blocks[0].a, x).value(),
                polynomial::evaluate(&blocks[0].b, x).value()
            ))
        );
        assert_eq!(shadow.block_points(2), None);
    }

    #[test]
    fn test_identities_are_one_to_n() {
        let shadows = evaluate_shadows(&sample_blocks(), 7, SplitMode::Parallel);
        let numbers: Vec<u8> = shadows.iter().map(|s| s.number).collect();
        assert_eq!(numbers, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn test_equal_stream_lengths() {
        let shadows = evaluate_shadows(&sample_blocks(), 6, SplitMode::Sequential);
        assert!(shadows.iter().all(|s| s.points.len() == 4));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let blocks = sample_blocks();
        assert_eq!(
            evaluate_shadows(&blocks, 9, SplitMode::Parallel),
            evaluate_shadows(&blocks, 9, SplitMode::Sequential)
        );
    }

    #[test]
    fn test_points_are_field_elements() {
        let shadows = evaluate_shadows(&sample_blocks(), 50, SplitMode::Parallel);
        for shadow in &shadows {
            assert!(shadow.points.iter().all(|&p| p <= 250));
        }
    }

    #[test]
    fn test_degenerate_point_forced_to_one() {
        assert_eq!(evaluation_point(251), FiniteField::ONE);
        assert_eq!(evaluation_point(0), FiniteField::ONE);
        let blocks = sample_blocks();
        assert_eq!(
            evaluate_shadow(&blocks, 251).points,
            evaluate_shadow(&blocks, 1).points
        );
    }

    #[test]
    fn test_any_k_shadows_recover_block() {
        let blocks = sample_blocks();
        let shadows = evaluate_shadows(&blocks, 5, SplitMode::Sequential);

        for subset in [[0usize, 1, 2], [0, 2, 4], [1, 3, 4], [2, 3, 4]] {
            for (index, block) in blocks.iter().enumerate() {
                let a_points: Vec<_> = subset
                    .iter()
                    .map(|&i| {
                        let (a, _) = shadows[i].block_points(index).unwrap();
                        (evaluation_point(shadows[i].number), FiniteField::new(a))
                    })
                    .collect();
                let b_points: Vec<_> = subset
                    .iter()
                    .map(|&i| {
                        let (_, b) = shadows[i].block_points(index).unwrap();
                        (evaluation_point(shadows[i].number), FiniteField::new(b))
                    })
                    .collect();

                let expected = |coefficients: &[u8]| -> Vec<FiniteField> {
                    coefficients.iter().map(|&c| FiniteField::new(c)).collect()
                };
                assert_eq!(interpolate(&a_points).unwrap(), expected(&block.a));
                assert_eq!(interpolate(&b_points).unwrap(), expected(&block.b));
            }
        }
    }
}
