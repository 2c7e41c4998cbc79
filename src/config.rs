use serde::{Deserialize, Serialize};

use crate::error::{Result, ShadowError};

/// Processing mode for per-shadow work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// Process shadows one after another
    Sequential,
    /// Evaluate and write shadows in parallel
    #[default]
    Parallel,
}

/// What to do with trailing secret bytes that do not fill a whole block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemainderPolicy {
    /// Fail the run with [`ShadowError::SecretNotBlockAligned`]
    #[default]
    Reject,
    /// Drop the trailing bytes
    Truncate,
    /// Zero-pad the last block to full size
    Pad,
}

/// Configuration options for a distribution run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Processing mode
    pub mode: SplitMode,
    /// Handling of a partial final block
    pub remainder: RemainderPolicy,
    /// Fixed seed for the blinding random source; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Config {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the processing mode
    pub fn with_mode(mut self, mode: SplitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the remainder policy
    pub fn with_remainder(mut self, remainder: RemainderPolicy) -> Self {
        self.remainder = remainder;
        self
    }

    /// Seeds the blinding random source for reproducible output
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parses a configuration from TOML text
    ///
    /// # Example
    /// ```
    /// use shadow_share::{Config, RemainderPolicy, SplitMode};
    ///
    /// let config = Config::from_toml_str("mode = \"sequential\"\nremainder = \"pad\"").unwrap();
    /// assert_eq!(config.mode, SplitMode::Sequential);
    /// assert_eq!(config.remainder, RemainderPolicy::Pad);
    /// assert_eq!(config.seed, None);
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ShadowError::InvalidConfig(e.to_string()))
    }
}
