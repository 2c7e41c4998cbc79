use rand::rngs::OsRng;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use rayon::prelude::*;

use crate::bitmap::Bitmap;
use crate::config::{Config, SplitMode};
use crate::embedder::{self, EmbedDepth};
use crate::error::{Result, ShadowError};
use crate::evaluator::{self, Shadow};
use crate::finite_field::MAX_ELEMENT;
use crate::splitter::{BlockSplitter, CoefficientVectors};
use crate::storage::ShadowStore;

/// Distributes a secret image into shadows hidden in cover images
///
/// The secret pixel array is cut into blocks of `2k - 2` bytes. Each block
/// becomes two degree `k - 1` polynomials over GF(251), evaluated at every
/// shadow number `1..=n`. The resulting share bytes are embedded in the low
/// bits of one cover image per shadow, and the shadow number is stamped into
/// the cover's reserved header field.
///
/// # Example
/// ```
/// use shadow_share::{Bitmap, Config, EmbedDepth, ShadowGenerator, embedder};
///
/// let mut generator = ShadowGenerator::builder(4, 3)
///     .with_config(Config::new().with_seed(5))
///     .build()
///     .unwrap();
///
/// let secret: Vec<u8> = (0..16).collect();
/// let shadows = generator.generate_shadows(&secret).unwrap();
///
/// let mut cover = Bitmap::blank(8, 2, 8).unwrap();
/// generator.hide_shadow(&shadows[1], &mut cover).unwrap();
/// assert_eq!(cover.shadow_number(), 2);
///
/// let stream_len = shadows[1].points.len();
/// let hidden = embedder::extract(cover.pixels(), stream_len, EmbedDepth::Lsb4).unwrap();
/// assert_eq!(hidden, shadows[1].points);
/// ```
pub struct ShadowGenerator {
    /// Total number of shadows to generate
    total_shadows: u8,
    /// Minimum number of shadows needed for reconstruction
    threshold: u8,
    /// Configuration options for the run
    config: Config,
    /// Source of the per-block blinding factors
    rng: ChaCha20Rng,
}

/// Builder for creating ShadowGenerator instances with custom configuration
///
/// # Example
/// ```
/// use shadow_share::{Config, ShadowGenerator, SplitMode};
///
/// let config = Config::new().with_mode(SplitMode::Sequential).with_seed(1);
///
/// let generator = ShadowGenerator::builder(5, 3)
///     .with_config(config)
///     .build()
///     .unwrap();
/// assert_eq!(generator.threshold(), 3);
/// ```
#[derive(Debug)]
pub struct ShadowGeneratorBuilder {
    total_shadows: u8,
    threshold: u8,
    config: Config,
}

impl ShadowGeneratorBuilder {
    /// Creates a new builder with the specified parameters and default configuration
    ///
    /// # Arguments
    /// * `total_shadows` - Number of shadows (and cover images), 2-250
    /// * `threshold` - Shadows required for reconstruction, 2-`total_shadows`
    pub fn new(total_shadows: u8, threshold: u8) -> Self {
        Self {
            total_shadows,
            threshold,
            config: Config::default(),
        }
    }

    /// Sets a custom configuration for the ShadowGenerator instance
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Builds the ShadowGenerator instance with validation
    ///
    /// # Errors
    /// Returns `ShadowError` if:
    /// - `threshold` < 2
    /// - `total_shadows` < 2 or > 250
    /// - `threshold` > `total_shadows`
    /// - the OS random source is unavailable and no seed was configured
    pub fn build(self) -> Result<ShadowGenerator> {
        if self.threshold < 2 {
            return Err(ShadowError::InvalidThreshold(self.threshold));
        }
        if self.total_shadows < 2 || self.total_shadows > MAX_ELEMENT {
            return Err(ShadowError::InvalidShadowCount(self.total_shadows));
        }
        if self.threshold > self.total_shadows {
            return Err(ShadowError::ThresholdTooLarge {
                threshold: self.threshold,
                total_shadows: self.total_shadows,
            });
        }

        let rng = match self.config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::try_from_rng(&mut OsRng)
                .map_err(|e| ShadowError::RandomSource(e.to_string()))?,
        };

        Ok(ShadowGenerator {
            total_shadows: self.total_shadows,
            threshold: self.threshold,
            config: self.config,
            rng,
        })
    }
}

impl ShadowGenerator {
    /// Creates a builder for configuring a ShadowGenerator instance
    pub fn builder(total_shadows: u8, threshold: u8) -> ShadowGeneratorBuilder {
        ShadowGeneratorBuilder::new(total_shadows, threshold)
    }

    /// Creates a generator with the default configuration
    pub fn new(total_shadows: u8, threshold: u8) -> Result<Self> {
        Self::builder(total_shadows, threshold).build()
    }

    pub fn total_shadows(&self) -> u8 {
        self.total_shadows
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bit depth used when hiding shadows of this generator
    pub fn embed_depth(&self) -> EmbedDepth {
        EmbedDepth::for_threshold(self.threshold)
    }

    /// Splits the secret pixel bytes into one share stream per shadow
    ///
    /// Shadow `i` of the result has number `i + 1`. All streams have the same
    /// length: two bytes per block.
    ///
    /// # Errors
    /// [`ShadowError::SecretNotBlockAligned`] if the secret leaves a partial
    /// block and the configured policy rejects it.
    pub fn generate_shadows(&mut self, secret: &[u8]) -> Result<Vec<Shadow>> {
        // Blinding factors are drawn here, once per block, so every shadow
        // evaluates the same B vector.
        let blocks: Vec<CoefficientVectors> = BlockSplitter::new(
            secret,
            self.threshold,
            self.config.remainder,
            &mut self.rng,
        )?
        .collect();

        log::debug!(
            "split {} secret bytes into {} blocks (k = {})",
            secret.len(),
            blocks.len(),
            self.threshold
        );

        Ok(evaluator::evaluate_shadows(
            &blocks,
            self.total_shadows,
            self.config.mode,
        ))
    }

    /// Embeds a shadow into a cover image and stamps its number
    ///
    /// # Errors
    /// [`ShadowError::CoverTooSmall`] if the cover's pixel array cannot hold
    /// the stream; the cover is left unmodified.
    pub fn hide_shadow(&self, shadow: &Shadow, cover: &mut Bitmap) -> Result<()> {
        let depth = self.embed_depth();
        embedder::embed(cover.pixels_mut(), &shadow.points, depth)
            .map_err(|e| e.for_shadow(shadow.number))?;
        cover.set_shadow_number(u16::from(shadow.number));
        Ok(())
    }

    /// Runs a full distribution: split the secret, hide every shadow in its
    /// cover and persist the covers through `store`.
    ///
    /// All covers are loaded and checked for capacity before the first one
    /// is written. After that each shadow is an independent task owning its
    /// cover. A failed write aborts the run but does not roll back shadows
    /// that were already stored.
    ///
    /// # Errors
    /// - [`ShadowError::CoverCountMismatch`] if `store` does not hold exactly
    ///   `n` covers
    /// - [`ShadowError::CoverTooSmall`] if any cover cannot hold its stream
    /// - any error from [`generate_shadows`](Self::generate_shadows) or the store
    pub fn distribute<S: ShadowStore>(
        &mut self,
        secret: &Bitmap,
        store: &S,
    ) -> Result<Vec<Shadow>> {
        let needed = self.total_shadows as usize;
        let available = store.cover_count();
        if available != needed {
            return Err(ShadowError::CoverCountMismatch {
                needed,
                got: available,
            });
        }

        let shadows = self.generate_shadows(secret.pixels())?;

        let depth = self.embed_depth();
        let required = shadows
            .first()
            .map_or(0, |s| embedder::required_cover_len(s.points.len(), depth));

        let mut covers = Vec::with_capacity(needed);
        for (index, shadow) in shadows.iter().enumerate() {
            let cover = store.load_cover(index)?;
            if cover.image_size_bytes() < required {
                return Err(ShadowError::CoverTooSmall {
                    shadow: shadow.number,
                    needed: required,
                    available: cover.image_size_bytes(),
                });
            }
            covers.push(cover);
        }

        log::info!(
            "hiding {} shadows of {} bytes ({:?}, k = {})",
            shadows.len(),
            shadows.first().map_or(0, |s| s.points.len()),
            depth,
            self.threshold
        );

        let hide_and_store =
            |(index, (shadow, mut cover)): (usize, (&Shadow, Bitmap))| -> Result<()> {
                self.hide_shadow(shadow, &mut cover)?;
                store.store_shadow(index, &cover)?;
                log::debug!("stored shadow {}", shadow.number);
                Ok(())
            };

        match self.config.mode {
            SplitMode::Sequential => shadows
                .iter()
                .zip(covers)
                .enumerate()
                .try_for_each(hide_and_store)?,
            SplitMode::Parallel => shadows
                .par_iter()
                .zip(covers)
                .enumerate()
                .try_for_each(hide_and_store)?,
        }

        Ok(shadows)
    }
}
