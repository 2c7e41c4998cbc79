use std::io;
use thiserror::Error;

/// Error type for shadow distribution operations
#[derive(Error, Debug)]
pub enum ShadowError {
    /// Invalid threshold value (must be 2 <= threshold <= shadow count)
    #[error("Invalid threshold value {0}")]
    InvalidThreshold(u8),

    /// Invalid shadow count (must be between 2 and 250)
    #[error("Invalid shadow count {0}")]
    InvalidShadowCount(u8),

    /// Threshold exceeds the number of shadows
    #[error("Threshold {threshold} exceeds total shadows {total_shadows}")]
    ThresholdTooLarge { threshold: u8, total_shadows: u8 },

    /// The number of cover images does not match the number of shadows
    #[error("Need {needed} cover images, found {got}")]
    CoverCountMismatch { needed: usize, got: usize },

    /// Secret length is not a multiple of the block size
    #[error("Secret of {len} bytes is not a multiple of the {block_size}-byte block size")]
    SecretNotBlockAligned { len: usize, block_size: usize },

    /// Cover pixel array cannot hold the shadow's share stream
    #[error("Cover for shadow {shadow} needs {needed} pixel bytes, has {available}")]
    CoverTooSmall {
        shadow: u8,
        needed: usize,
        available: usize,
    },

    /// Malformed bitmap container
    #[error("Invalid bitmap: {0}")]
    InvalidBitmap(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The OS random source could not seed the generator
    #[error("Random source error: {0}")]
    RandomSource(String),

    /// Two interpolation points share the same x coordinate
    #[error("Duplicate interpolation point")]
    DuplicatePoint,

    /// General I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl ShadowError {
    /// Attaches a shadow number to a [`ShadowError::CoverTooSmall`]; other
    /// errors pass through unchanged
    pub(crate) fn for_shadow(self, number: u8) -> Self {
        match self {
            Self::CoverTooSmall {
                needed, available, ..
            } => Self::CoverTooSmall {
                shadow: number,
                needed,
                available,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShadowError>;
