//! Per-run protocol configuration.
//!
//! A `RunConfig` is created by the caller and consumed by exactly one
//! protocol run. Validation happens before any randomness is drawn so
//! that a bad configuration never produces a partial result.

use serde::{Deserialize, Serialize};

/// Default QBER abort threshold for BB84 with one-way post-processing.
pub const DEFAULT_SECURITY_THRESHOLD: f64 = 0.11;

/// Largest threshold accepted; above 0.5 the channel carries no information.
pub const MAX_SECURITY_THRESHOLD: f64 = 0.5;

/// Configuration for a single BB84 run.
///
/// Immutable once a run starts: the orchestrator only ever borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of qubits Alice prepares.
    pub bit_count: usize,
    /// Probability that the channel flips Bob's outcome.
    pub noise_probability: f64,
    /// Whether an intercept-resend eavesdropper sits on the channel.
    pub eavesdropper_enabled: bool,
    /// Fraction of qubits the eavesdropper attacks when enabled.
    pub intercept_fraction: f64,
    /// Fraction of the sifted key disclosed for error estimation.
    pub sample_fraction: f64,
    /// Smallest sample that yields a usable QBER.
    ///
    /// Defaults to 2, so a one-bit sample is insufficient data. Set it to 1
    /// to abort only when the sample is empty.
    pub min_sample_size: usize,
    /// Maximum tolerated QBER (inclusive).
    pub security_threshold: f64,
    /// Seed for reproducible runs. Drawn from the OS when absent.
    pub random_seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            bit_count: 200,
            noise_probability: 0.0,
            eavesdropper_enabled: false,
            intercept_fraction: 1.0,
            sample_fraction: 0.5,
            min_sample_size: 2,
            security_threshold: DEFAULT_SECURITY_THRESHOLD,
            random_seed: None,
        }
    }
}

impl RunConfig {
    /// Creates a configuration for `bit_count` qubits with default settings.
    pub fn with_bit_count(bit_count: usize) -> Self {
        Self {
            bit_count,
            ..Default::default()
        }
    }

    /// Sets the channel noise probability.
    pub fn noise(mut self, probability: f64) -> Self {
        self.noise_probability = probability;
        self
    }

    /// Enables or disables the intercept-resend eavesdropper.
    pub fn eavesdropper(mut self, enabled: bool) -> Self {
        self.eavesdropper_enabled = enabled;
        self
    }

    /// Sets the fraction of qubits the eavesdropper attacks.
    pub fn intercept_fraction(mut self, fraction: f64) -> Self {
        self.intercept_fraction = fraction;
        self
    }

    /// Sets the disclosed sample fraction.
    pub fn sample_fraction(mut self, fraction: f64) -> Self {
        self.sample_fraction = fraction;
        self
    }

    /// Sets the QBER abort threshold.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.security_threshold = threshold;
        self
    }

    /// Fixes the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bit_count == 0 {
            return Err(ConfigError::InvalidBitCount);
        }
        if !is_probability(self.noise_probability) {
            return Err(ConfigError::InvalidNoiseProbability(self.noise_probability));
        }
        if !is_probability(self.intercept_fraction) {
            return Err(ConfigError::InvalidInterceptFraction(self.intercept_fraction));
        }
        if !(self.sample_fraction > 0.0 && self.sample_fraction <= 1.0) {
            return Err(ConfigError::InvalidSampleFraction(self.sample_fraction));
        }
        if self.min_sample_size == 0 {
            return Err(ConfigError::InvalidMinSampleSize);
        }
        if !(0.0..=MAX_SECURITY_THRESHOLD).contains(&self.security_threshold) {
            return Err(ConfigError::InvalidThreshold(self.security_threshold));
        }
        Ok(())
    }
}

fn is_probability(p: f64) -> bool {
    (0.0..=1.0).contains(&p)
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("bit count must be positive")]
    InvalidBitCount,
    #[error("noise probability {0} outside [0, 1]")]
    InvalidNoiseProbability(f64),
    #[error("intercept fraction {0} outside [0, 1]")]
    InvalidInterceptFraction(f64),
    #[error("sample fraction {0} outside (0, 1]")]
    InvalidSampleFraction(f64),
    #[error("minimum sample size must be positive")]
    InvalidMinSampleSize,
    #[error("security threshold {0} outside [0, 0.5]")]
    InvalidThreshold(f64),
    #[error("run count must be positive")]
    InvalidRunCount,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}
