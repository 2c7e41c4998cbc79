//! (k, n) threshold secret image sharing with shadows hidden in BMP covers
//!
//! A secret bitmap's pixel array is split into `n` shadows so that any `k`
//! of them reconstruct it while fewer reveal nothing. Shadows are not stored
//! as files of their own: each one is embedded in the low bits of a distinct
//! cover bitmap, whose reserved header field records the shadow number.
//!
//! Arithmetic is done in GF(251). Blocks of `2k - 2` secret bytes become two
//! polynomials of degree `k - 1`, and each shadow holds both evaluations at
//! its own number. Covers hide 4 bits per pixel byte for `k` in {3, 4} and 2
//! bits otherwise.
//!
//! # Quick Start
//!
//! ```
//! use shadow_share::{Bitmap, Config, FileShadowStore, ShadowGenerator, ShadowStore};
//!
//! let temp_dir = tempfile::tempdir().unwrap();
//! for i in 1..=5 {
//!     let cover = Bitmap::blank(16, 16, 8).unwrap();
//!     std::fs::write(temp_dir.path().join(format!("cover{i}.bmp")), cover.to_bytes()).unwrap();
//! }
//!
//! // 4 x 4 secret, one 4-byte block per row for k = 3
//! let pixels: Vec<u8> = (0..16).map(|i| i * 15).collect();
//! let secret = Bitmap::blank(4, 4, 8).unwrap().with_pixels(&pixels).unwrap();
//!
//! let mut generator = ShadowGenerator::builder(5, 3).build().unwrap();
//! let store = FileShadowStore::open(temp_dir.path()).unwrap();
//! let shadows = generator.distribute(&secret, &store).unwrap();
//!
//! assert_eq!(shadows.len(), 5);
//! assert_eq!(store.load_cover(4).unwrap().shadow_number(), 5);
//! ```

mod bitmap;
mod config;
pub mod embedder;
mod error;
pub mod evaluator;
mod finite_field;
mod generator;
pub mod polynomial;
pub mod splitter;
mod storage;

pub use bitmap::Bitmap;
pub use config::{Config, RemainderPolicy, SplitMode};
pub use embedder::EmbedDepth;
pub use error::{Result, ShadowError};
pub use evaluator::Shadow;
pub use finite_field::{FiniteField, PRIME, reduce};
pub use generator::{ShadowGenerator, ShadowGeneratorBuilder};
pub use storage::{FileShadowStore, ShadowStore};

// Re-export common types for convenience
pub mod prelude {
    pub use super::{
        Bitmap, Config, EmbedDepth, FileShadowStore, RemainderPolicy, Result, Shadow,
        ShadowError, ShadowGenerator, ShadowStore, SplitMode,
    };
}
