//! Intercept-resend eavesdropper parameters.

use crate::config::{ConfigError, RunConfig};

/// Parameters of an intercept-resend attack.
///
/// For each attacked qubit the eavesdropper picks a uniformly random
/// basis, measures, and resends a fresh qubit prepared in that basis
/// with the measured value. Attacking every qubit yields an expected
/// QBER of 0.25 on the sifted key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EavesdropperModel {
    intercept_fraction: f64,
}

impl Default for EavesdropperModel {
    fn default() -> Self {
        Self {
            intercept_fraction: 1.0,
        }
    }
}

impl EavesdropperModel {
    /// Creates a model attacking the given fraction of qubits.
    pub fn with_fraction(intercept_fraction: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&intercept_fraction) {
            return Err(ConfigError::InvalidInterceptFraction(intercept_fraction));
        }
        Ok(Self { intercept_fraction })
    }

    /// Probability that a given qubit is intercepted.
    #[inline]
    pub fn intercept_fraction(&self) -> f64 {
        self.intercept_fraction
    }

    /// QBER this attack adds on its own: 1/2 wrong basis * 1/2 wrong value.
    pub fn expected_qber(&self) -> f64 {
        0.25 * self.intercept_fraction
    }
}

/// Physical conditions a channel applies to every qubit of a run.
///
/// Only constructible with in-range probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelConditions {
    noise_probability: f64,
    eavesdropper: Option<EavesdropperModel>,
}

impl ChannelConditions {
    /// Creates conditions with the given noise and optional attack.
    pub fn new(
        noise_probability: f64,
        eavesdropper: Option<EavesdropperModel>,
    ) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&noise_probability) {
            return Err(ConfigError::InvalidNoiseProbability(noise_probability));
        }
        Ok(Self {
            noise_probability,
            eavesdropper,
        })
    }

    /// A perfect channel with no noise and no eavesdropper.
    pub fn ideal() -> Self {
        Self {
            noise_probability: 0.0,
            eavesdropper: None,
        }
    }

    /// Extracts the channel conditions from a run configuration.
    pub fn from_config(config: &RunConfig) -> Result<Self, ConfigError> {
        let eavesdropper = if config.eavesdropper_enabled {
            Some(EavesdropperModel::with_fraction(config.intercept_fraction)?)
        } else {
            None
        };
        Self::new(config.noise_probability, eavesdropper)
    }

    /// Probability of flipping the receiver's outcome.
    #[inline]
    pub fn noise_probability(&self) -> f64 {
        self.noise_probability
    }

    /// Active eavesdropper, if any.
    #[inline]
    pub fn eavesdropper(&self) -> Option<&EavesdropperModel> {
        self.eavesdropper.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_attack_expected_qber() {
        assert!((EavesdropperModel::default().expected_qber() - 0.25).abs() < 1e-12);
        let partial = EavesdropperModel::with_fraction(0.4).unwrap();
        assert!((partial.expected_qber() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_conditions_from_config() {
        let config = RunConfig::default().noise(0.03);
        let conditions = ChannelConditions::from_config(&config).unwrap();
        assert_eq!(conditions.noise_probability(), 0.03);
        assert!(conditions.eavesdropper().is_none());

        let config = RunConfig::default().eavesdropper(true).intercept_fraction(0.5);
        let conditions = ChannelConditions::from_config(&config).unwrap();
        assert_eq!(conditions.eavesdropper().map(|m| m.intercept_fraction()), Some(0.5));
    }

    #[test]
    fn test_out_of_range_noise_rejected() {
        assert_eq!(
            ChannelConditions::new(1.5, None),
            Err(ConfigError::InvalidNoiseProbability(1.5))
        );
        assert!(ChannelConditions::new(-0.1, None).is_err());
        assert!(ChannelConditions::new(f64::NAN, None).is_err());
        assert!(ChannelConditions::new(1.0, None).is_ok());
    }

    #[test]
    fn test_out_of_range_intercept_rejected() {
        assert_eq!(
            EavesdropperModel::with_fraction(1.2),
            Err(ConfigError::InvalidInterceptFraction(1.2))
        );
        assert!(EavesdropperModel::with_fraction(f64::NAN).is_err());

        let config = RunConfig {
            intercept_fraction: 2.0,
            ..RunConfig::default().eavesdropper(true)
        };
        assert!(ChannelConditions::from_config(&config).is_err());
    }
}
