#![no_main]

use libfuzzer_sys::fuzz_target;
use shadow_share::FiniteField;
use shadow_share::polynomial::{evaluate, interpolate};

// Fuzzing target for polynomial::interpolate
//
// The first byte picks a point count (1-16), the following bytes are
// coefficients and x coordinates. Duplicate x values must produce an
// error; distinct ones must recover the coefficients that generated the
// points, reduced into GF(251).
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let count = (data[0] % 16 + 1) as usize;
    let rest = &data[1..];
    if rest.len() < 2 * count {
        return;
    }

    let coefficients = &rest[..count];
    let xs: Vec<FiniteField> = rest[count..2 * count]
        .iter()
        .map(|&x| FiniteField::new(x))
        .collect();

    let points: Vec<(FiniteField, FiniteField)> = xs
        .iter()
        .map(|&x| (x, evaluate(coefficients, x)))
        .collect();

    let distinct = xs
        .iter()
        .enumerate()
        .all(|(i, x)| xs[..i].iter().all(|other| other != x));

    match interpolate(&points) {
        Ok(recovered) => {
            assert!(distinct);
            let expected: Vec<FiniteField> =
                coefficients.iter().map(|&c| FiniteField::new(c)).collect();
            assert_eq!(recovered, expected);
        }
        Err(_) => assert!(!distinct),
    }
});
