//! Block splitting and coefficient blinding
//!
//! The secret pixel stream is cut into disjoint blocks of `2k - 2` bytes.
//! Each block yields two coefficient vectors of length `k`:
//!
//! ```text
//! block:  [ s0 s1 .. s(k-1) | sk .. s(2k-3) ]
//! A:      [ s0 s1 .. s(k-1) ]
//! B:      [ b0 b1 | sk .. s(2k-3) ]
//! ```
//!
//! `b0` and `b1` are blinded copies of the leading two A coefficients,
//! `bi = -r · ai'`, where `r` is drawn from `[1, 250]` once per block and
//! `ai'` is the reduced coefficient with zero replaced by one.

use std::borrow::Cow;

use rand::Rng;
#[cfg(feature = "zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::RemainderPolicy;
use crate::error::{Result, ShadowError};
use crate::finite_field::{FiniteField, MAX_ELEMENT};

/// Number of secret bytes consumed per block for threshold `k`
#[inline]
pub const fn block_size(threshold: u8) -> usize {
    (2 * threshold as usize).saturating_sub(2)
}

/// Number of blocks a secret of `len` bytes produces under `policy`
///
/// # Errors
/// [`ShadowError::SecretNotBlockAligned`] when `policy` is
/// [`RemainderPolicy::Reject`] and `len` leaves a partial block.
///
/// # Example
/// ```
/// use shadow_share::{RemainderPolicy, splitter};
///
/// assert_eq!(splitter::block_count(12, 4, RemainderPolicy::Reject).unwrap(), 2);
/// assert_eq!(splitter::block_count(13, 4, RemainderPolicy::Truncate).unwrap(), 2);
/// assert_eq!(splitter::block_count(13, 4, RemainderPolicy::Pad).unwrap(), 3);
/// assert!(splitter::block_count(13, 4, RemainderPolicy::Reject).is_err());
/// ```
pub fn block_count(len: usize, threshold: u8, policy: RemainderPolicy) -> Result<usize> {
    if threshold < 2 {
        return Err(ShadowError::InvalidThreshold(threshold));
    }
    let size = block_size(threshold);
    let full = len / size;
    let remainder = len % size;

    match (remainder, policy) {
        (0, _) => Ok(full),
        (_, RemainderPolicy::Reject) => Err(ShadowError::SecretNotBlockAligned {
            len,
            block_size: size,
        }),
        (_, RemainderPolicy::Truncate) => Ok(full),
        (_, RemainderPolicy::Pad) => Ok(full + 1),
    }
}

/// The pair of polynomials derived from one block
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "zeroize", derive(Zeroize, ZeroizeOnDrop))]
pub struct CoefficientVectors {
    /// First `k` block bytes, unreduced
    pub a: Vec<u8>,
    /// Two blinded field elements followed by the trailing `k - 2` block bytes
    pub b: Vec<u8>,
}

impl CoefficientVectors {
    /// Builds both vectors from a full block using blinding factor `r`.
    ///
    /// `block` must be exactly `2k - 2` bytes long.
    ///
    /// # Example
    /// ```
    /// use shadow_share::FiniteField;
    /// use shadow_share::splitter::CoefficientVectors;
    ///
    /// let vectors = CoefficientVectors::from_block(&[10, 20, 30, 40], 3, FiniteField::new(1));
    /// assert_eq!(vectors.a, vec![10, 20, 30]);
    /// // -1 * 10 and -1 * 20 in GF(251)
    /// assert_eq!(vectors.b, vec![241, 231, 40]);
    /// ```
    pub fn from_block(block: &[u8], threshold: u8, r: FiniteField) -> Self {
        let k = threshold as usize;
        debug_assert_eq!(block.len(), block_size(threshold));

        let a = block[..k].to_vec();

        let blind = r.negate();
        let a0 = FiniteField::new(a[0]).nonzero_or_one();
        let a1 = FiniteField::new(a[1]).nonzero_or_one();

        let mut b = Vec::with_capacity(k);
        b.push((blind * a0).value());
        b.push((blind * a1).value());
        b.extend_from_slice(&block[k..]);

        Self { a, b }
    }
}

/// Iterator over the coefficient vectors of every block of a secret
///
/// The random source is borrowed rather than owned so callers can thread a
/// seeded generator through consecutive runs.
///
/// # Example
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha20Rng;
/// use shadow_share::RemainderPolicy;
/// use shadow_share::splitter::BlockSplitter;
///
/// let mut rng = ChaCha20Rng::seed_from_u64(1);
/// let secret = [1u8, 2, 3, 4, 5, 6, 7, 8];
/// let splitter = BlockSplitter::new(&secret, 3, RemainderPolicy::Reject, &mut rng).unwrap();
/// assert_eq!(splitter.len(), 2);
///
/// let blocks: Vec<_> = splitter.collect();
/// assert_eq!(blocks[0].a, vec![1, 2, 3]);
/// assert_eq!(blocks[1].a, vec![5, 6, 7]);
/// assert_eq!(blocks[1].b[2], 8);
/// ```
pub struct BlockSplitter<'a, R: Rng> {
    data: Cow<'a, [u8]>,
    threshold: u8,
    next_block: usize,
    block_count: usize,
    rng: &'a mut R,
}

impl<'a, R: Rng> BlockSplitter<'a, R> {
    /// Prepares a splitter over `secret` for threshold `k`
    ///
    /// # Errors
    /// - [`ShadowError::InvalidThreshold`] if `threshold < 2`
    /// - [`ShadowError::SecretNotBlockAligned`] under [`RemainderPolicy::Reject`]
    pub fn new(
        secret: &'a [u8],
        threshold: u8,
        policy: RemainderPolicy,
        rng: &'a mut R,
    ) -> Result<Self> {
        let block_count = block_count(secret.len(), threshold, policy)?;
        let padded_len = block_count * block_size(threshold);

        let data = if padded_len > secret.len() {
            let mut padded = Vec::with_capacity(padded_len);
            padded.extend_from_slice(secret);
            padded.resize(padded_len, 0);
            Cow::Owned(padded)
        } else {
            Cow::Borrowed(secret)
        };

        Ok(Self {
            data,
            threshold,
            next_block: 0,
            block_count,
            rng,
        })
    }

    /// Draws a non-zero blinding factor uniformly from `[1, 250]`
    #[inline]
    fn draw_blinding_factor(&mut self) -> FiniteField {
        FiniteField::new(self.rng.random_range(1..=MAX_ELEMENT))
    }
}

impl<R: Rng> Iterator for BlockSplitter<'_, R> {
    type Item = CoefficientVectors;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_block >= self.block_count {
            return None;
        }

        let size = block_size(self.threshold);
        let start = self.next_block * size;
        self.next_block += 1;

        let r = self.draw_blinding_factor();
        Some(CoefficientVectors::from_block(
            &self.data[start..start + size],
            self.threshold,
            r,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.block_count - self.next_block;
        (remaining, Some(remaining))
    }
}

impl<R: Rng> ExactSizeIterator for BlockSplitter<'_, R> {}

#[cfg(feature = "zeroize")]
impl<R: Rng> Drop for BlockSplitter<'_, R> {
    fn drop(&mut self) {
        if let Cow::Owned(padded) = &mut self.data {
            padded.zeroize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    /// One full 4-byte block plus a single trailing byte
    const PARTIAL: [u8; 5] = [1, 2, 3, 4, 5];

    #[test]
    fn test_block_size() {
        assert_eq!(block_size(2), 2);
        assert_eq!(block_size(3), 4);
        assert_eq!(block_size(8), 14);
    }

    #[test]
    fn test_block_count_invalid_threshold() {
        assert!(matches!(
            block_count(10, 1, RemainderPolicy::Pad),
            Err(ShadowError::InvalidThreshold(1))
        ));
    }

    #[test]
    fn test_aligned_secret_fully_consumed() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let secret: Vec<u8> = (0..60).collect();
        for k in 2..=6u8 {
            if secret.len() % block_size(k) != 0 {
                continue;
            }
            let blocks: Vec<_> = BlockSplitter::new(&secret, k, RemainderPolicy::Reject, &mut rng)
                .unwrap()
                .collect();
            assert_eq!(blocks.len() * block_size(k), secret.len());

            // Every non-blinded byte appears exactly once, in order
            let mut consumed = Vec::new();
            for block in &blocks {
                consumed.extend_from_slice(&block.a);
                consumed.extend_from_slice(&block.b[2..]);
            }
            assert_eq!(consumed, secret);
        }
    }

    #[test]
    fn test_reject_partial_block() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let result = BlockSplitter::new(&PARTIAL, 3, RemainderPolicy::Reject, &mut rng);
        assert!(matches!(
            result,
            Err(ShadowError::SecretNotBlockAligned {
                len: 5,
                block_size: 4
            })
        ));
    }

    #[test]
    fn test_pad_partial_block() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let splitter = BlockSplitter::new(&PARTIAL, 3, RemainderPolicy::Pad, &mut rng);
        let blocks: Vec<_> = splitter.unwrap().collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].a, vec![5, 0, 0]);
        assert_eq!(blocks[1].b[2], 0);
    }

    #[test]
    fn test_truncate_partial_block() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let splitter = BlockSplitter::new(&PARTIAL, 3, RemainderPolicy::Truncate, &mut rng);
        let blocks: Vec<_> = splitter.unwrap().collect();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].a, vec![1, 2, 3]);
    }

    #[test]
    fn test_blinding_relation() {
        // B[0] * a1' == B[1] * a0' since both are -r times their coefficient
        let mut rng = ChaCha20Rng::seed_from_u64(99);
        let secret: Vec<u8> = (0..=255u8).cycle().take(240).collect();
        let splitter = BlockSplitter::new(&secret, 5, RemainderPolicy::Reject, &mut rng);
        for block in splitter.unwrap() {
            let a0 = FiniteField::new(block.a[0]).nonzero_or_one();
            let a1 = FiniteField::new(block.a[1]).nonzero_or_one();
            let b0 = FiniteField::new(block.b[0]);
            let b1 = FiniteField::new(block.b[1]);
            assert!(!b0.is_zero());
            assert!(!b1.is_zero());
            assert_eq!(b0 * a1, b1 * a0);
        }
    }

    #[test]
    fn test_zero_leading_coefficients_replaced() {
        let r = FiniteField::new(5);
        let vectors = CoefficientVectors::from_block(&[0, 251, 9, 9], 3, r);
        // Both leading coefficients reduce to zero and are blinded as one
        assert_eq!(vectors.b[0], r.negate().value());
        assert_eq!(vectors.b[1], r.negate().value());
        // A is copied raw
        assert_eq!(vectors.a, vec![0, 251, 9]);
    }

    #[test]
    fn test_threshold_two_has_no_trailing_bytes() {
        let vectors = CoefficientVectors::from_block(&[7, 8], 2, FiniteField::new(3));
        assert_eq!(vectors.a, vec![7, 8]);
        assert_eq!(vectors.b.len(), 2);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let secret: Vec<u8> = (0..64).collect();
        let run = |seed| {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            BlockSplitter::new(&secret, 3, RemainderPolicy::Reject, &mut rng)
                .unwrap()
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
        assert_ne!(run(11), run(12));
    }
}
