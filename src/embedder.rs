//! LSB embedding of share streams into cover pixel bytes
//!
//! Every share byte is spread over consecutive cover bytes, most significant
//! bits first, overwriting only the low bits of each cover byte:
//!
//! ```text
//! Lsb4 (k = 3, 4):  share 0bAAAA_BBBB -> cover[0] = hhhh_AAAA, cover[1] = hhhh_BBBB
//! Lsb2 (others):    share 0bAABB_CCDD -> cover[0..4] = hhhhhh_AA .. hhhhhh_DD
//! ```

use crate::error::{Result, ShadowError};

/// Number of low bits replaced in each cover byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedDepth {
    /// Low nibble of two cover bytes per share byte
    Lsb4,
    /// Low two bits of four cover bytes per share byte
    Lsb2,
}

impl EmbedDepth {
    /// Depth used for threshold `k`
    ///
    /// # Example
    /// ```
    /// use shadow_share::EmbedDepth;
    ///
    /// assert_eq!(EmbedDepth::for_threshold(3), EmbedDepth::Lsb4);
    /// assert_eq!(EmbedDepth::for_threshold(4), EmbedDepth::Lsb4);
    /// assert_eq!(EmbedDepth::for_threshold(2), EmbedDepth::Lsb2);
    /// assert_eq!(EmbedDepth::for_threshold(5), EmbedDepth::Lsb2);
    /// ```
    #[inline]
    pub fn for_threshold(threshold: u8) -> Self {
        match threshold {
            3 | 4 => Self::Lsb4,
            _ => Self::Lsb2,
        }
    }

    /// Cover bytes consumed by one share byte
    #[inline]
    pub fn cover_bytes_per_share_byte(self) -> usize {
        self.shifts().len()
    }

    /// Bits of the cover byte left untouched
    #[inline]
    pub fn preserved_mask(self) -> u8 {
        match self {
            Self::Lsb4 => 0xF0,
            Self::Lsb2 => 0xFC,
        }
    }

    /// Right shifts isolating each bit group of a share byte, in write order
    #[inline]
    fn shifts(self) -> &'static [u32] {
        const LSB4_SHIFTS: [u32; 2] = [4, 0];
        const LSB2_SHIFTS: [u32; 4] = [6, 4, 2, 0];
        match self {
            Self::Lsb4 => &LSB4_SHIFTS,
            Self::Lsb2 => &LSB2_SHIFTS,
        }
    }

    /// Mask applied to a shifted share byte
    #[inline]
    fn group_mask(self) -> u8 {
        !self.preserved_mask()
    }
}

/// Number of share bytes a cover of `cover_len` pixel bytes can hold
#[inline]
pub fn capacity(cover_len: usize, depth: EmbedDepth) -> usize {
    cover_len / depth.cover_bytes_per_share_byte()
}

/// Cover pixel bytes needed to hold `stream_len` share bytes
#[inline]
pub fn required_cover_len(stream_len: usize, depth: EmbedDepth) -> usize {
    stream_len * depth.cover_bytes_per_share_byte()
}

/// Writes one share byte into the leading cover bytes of `cover`
#[inline]
fn insert_bits(cover: &mut [u8], share: u8, depth: EmbedDepth) {
    let keep = depth.preserved_mask();
    let group = depth.group_mask();
    for (pixel, &shift) in cover.iter_mut().zip(depth.shifts()) {
        *pixel = (*pixel & keep) | ((share >> shift) & group);
    }
}

/// Reads one share byte back from the leading cover bytes of `cover`
#[inline]
fn collect_bits(cover: &[u8], depth: EmbedDepth) -> u8 {
    let group = depth.group_mask();
    cover
        .iter()
        .zip(depth.shifts())
        .fold(0u8, |acc, (&pixel, &shift)| acc | ((pixel & group) << shift))
}

/// Embeds `stream` into the low bits of `cover`, in order, starting at the
/// first cover byte.
///
/// Cover bytes past the embedded region are left untouched.
///
/// # Errors
/// Returns [`ShadowError::CoverTooSmall`] (with shadow number 0) without
/// modifying `cover` if the stream does not fit.
///
/// # Example
/// ```
/// use shadow_share::{EmbedDepth, embedder};
///
/// let mut cover = [0xAA, 0xAA, 0xAA];
/// embedder::embed(&mut cover, &[0x5C], EmbedDepth::Lsb4).unwrap();
/// assert_eq!(cover, [0xA5, 0xAC, 0xAA]);
/// ```
pub fn embed(cover: &mut [u8], stream: &[u8], depth: EmbedDepth) -> Result<()> {
    let needed = required_cover_len(stream.len(), depth);
    if needed > cover.len() {
        return Err(ShadowError::CoverTooSmall {
            shadow: 0,
            needed,
            available: cover.len(),
        });
    }

    let step = depth.cover_bytes_per_share_byte();
    for (pixels, &share) in cover.chunks_exact_mut(step).zip(stream) {
        insert_bits(pixels, share, depth);
    }
    Ok(())
}

/// Recovers `len` share bytes previously written by [`embed`]
///
/// # Example
/// ```
/// use shadow_share::{EmbedDepth, embedder};
///
/// let mut cover = vec![0x7F; 8];
/// embedder::embed(&mut cover, &[0xB4, 0x01], EmbedDepth::Lsb2).unwrap();
/// assert_eq!(embedder::extract(&cover, 2, EmbedDepth::Lsb2).unwrap(), vec![0xB4, 0x01]);
/// ```
pub fn extract(cover: &[u8], len: usize, depth: EmbedDepth) -> Result<Vec<u8>> {
    let needed = required_cover_len(len, depth);
    if needed > cover.len() {
        return Err(ShadowError::CoverTooSmall {
            shadow: 0,
            needed,
            available: cover.len(),
        });
    }

    let step = depth.cover_bytes_per_share_byte();
    Ok(cover[..needed]
        .chunks_exact(step)
        .map(|pixels| collect_bits(pixels, depth))
        .collect())
}
