//! TOML configuration file format.

use super::{ConfigError, RunConfig};
use crate::amplification::HashAlgorithm;
use crate::montecarlo::SeedStrategy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub amplification: AmplificationConfig,
}

/// Monte Carlo batch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of independent runs.
    pub runs: usize,
    /// How per-run seeds are obtained from the batch seed.
    pub seed_strategy: SeedStrategy,
    /// Noise levels for a sweep (empty disables sweeping).
    pub sweep_noise: Vec<f64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            runs: 50,
            seed_strategy: SeedStrategy::Derived,
            sweep_noise: Vec::new(),
        }
    }
}

/// Privacy amplification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmplificationConfig {
    /// Whether secure runs distill their final key.
    pub enabled: bool,
    /// Hash used by the extractor.
    pub algorithm: HashAlgorithm,
}

impl Default for AmplificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            algorithm: HashAlgorithm::Blake3,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.run.validate()?;
        if config.batch.runs == 0 {
            return Err(ConfigError::InvalidRunCount);
        }
        Ok(config)
    }
}
