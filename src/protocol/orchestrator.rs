//! Sequences generation, transmission, sifting, estimation, decision
//! and information analysis into a single run.

use super::result::{AbortReason, Outcome, RunResult};
use super::state::{ProtocolState, RunStateMachine};
use crate::amplification::PrivacyAmplifier;
use crate::analysis::{
    ErrorEstimator, InformationAnalyzer, InformationError, SecurityDecider,
};
use crate::channel::{ChannelConditions, QuantumChannel, SimulatedChannel};
use crate::config::{ConfigError, RunConfig};
use crate::generator::{os_seed, stream_rng, ObservedBit, RandomSequenceGenerator, Stream};
use crate::sifting::{sift, SiftingError};
use rand_core::RngCore;
use thiserror::Error;

/// Errors that abort a run before it can produce a result.
///
/// A security abort is not among them: it is a normal [`Outcome`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sifting(#[from] SiftingError),
    #[error(transparent)]
    Information(#[from] InformationError),
}

/// BB84 protocol orchestrator.
///
/// Holds only stateless collaborators, so a single instance can serve
/// any number of runs, concurrently if needed.
#[derive(Debug, Clone)]
pub struct Protocol<C = SimulatedChannel> {
    channel: C,
    analyzer: InformationAnalyzer,
    amplifier: Option<PrivacyAmplifier>,
}

impl Default for Protocol<SimulatedChannel> {
    fn default() -> Self {
        Self::new(SimulatedChannel::new())
    }
}

impl<C: QuantumChannel> Protocol<C> {
    /// Creates an orchestrator over `channel` with the intercept-resend
    /// leakage bound and BLAKE3 privacy amplification.
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            analyzer: InformationAnalyzer::default(),
            amplifier: Some(PrivacyAmplifier::default()),
        }
    }

    /// Replaces the information analyzer (and its leakage policy).
    pub fn with_analyzer(mut self, analyzer: InformationAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Sets the privacy amplifier; `None` skips amplification.
    pub fn with_amplifier(mut self, amplifier: Option<PrivacyAmplifier>) -> Self {
        self.amplifier = amplifier;
        self
    }

    /// Returns the channel collaborator.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Executes one run.
    ///
    /// Uses `config.random_seed`, or a fresh OS seed when absent.
    pub fn run_once(&self, config: &RunConfig) -> Result<RunResult, ProtocolError> {
        let seed = config.random_seed.unwrap_or_else(os_seed);
        self.run_with_seed(config, seed)
    }

    /// Executes one run with an explicit seed, ignoring `config.random_seed`.
    pub fn run_with_seed(&self, config: &RunConfig, seed: u64) -> Result<RunResult, ProtocolError> {
        config.validate()?;

        let bit_count = config.bit_count;
        let mut machine = RunStateMachine::new(seed);

        let mut generator = RandomSequenceGenerator::from_seed(seed);
        let alice = generator.prepare_alice(bit_count);
        let bob_bases = generator.choose_bob_bases(bit_count);
        machine.advance(ProtocolState::Prepared);

        let conditions = ChannelConditions::from_config(config)?;
        let mut channel_rng = stream_rng(seed, Stream::Channel);
        let bob: Vec<ObservedBit> = alice
            .iter()
            .zip(&bob_bases)
            .map(|(&sent, &basis)| ObservedBit {
                value: self
                    .channel
                    .transmit(sent, basis, &conditions, &mut channel_rng),
                basis,
            })
            .collect();
        machine.advance(ProtocolState::Transmitted);

        let sifted = sift(&alice, &bob)?;
        let sifted_length = sifted.len();
        let sifting_efficiency = sifted.efficiency(bit_count);
        machine.advance(ProtocolState::Sifted);

        let mut result = RunResult {
            config: RunConfig {
                random_seed: Some(seed),
                ..config.clone()
            },
            seed,
            outcome: Outcome::Secure,
            secure: false,
            final_state: ProtocolState::Sifted,
            sifted_length,
            sifting_efficiency,
            estimate: None,
            qber: None,
            final_key_length: 0,
            information: None,
            distilled_key: None,
        };

        let estimator = ErrorEstimator::from_config(config);
        let estimation = match estimator.estimate(&sifted, &mut stream_rng(seed, Stream::Sampling)) {
            Ok(estimation) => estimation,
            Err(insufficient) => {
                machine.advance(ProtocolState::Aborted);
                tracing::debug!(
                    seed,
                    sifted = sifted_length,
                    reason = %insufficient,
                    "Run aborted: insufficient data"
                );
                result.outcome = Outcome::Aborted(AbortReason::InsufficientData(insufficient));
                result.final_state = machine.state();
                return Ok(result);
            }
        };
        machine.advance(ProtocolState::Estimated);

        let qber = estimation.estimate.qber;
        let information = self.analyzer.analyze(qber, sifting_efficiency)?;
        result.estimate = Some(estimation.estimate);
        result.qber = Some(qber);
        result.information = Some(information);

        match SecurityDecider::new(config.security_threshold).check(qber) {
            Ok(()) => {
                machine.advance(ProtocolState::Secure);
                let key = estimation.remaining.alice();
                result.secure = true;
                result.final_key_length = key.len();
                result.distilled_key = self.amplifier.map(|amplifier| {
                    let mut salt = [0u8; 32];
                    stream_rng(seed, Stream::Amplification).fill_bytes(&mut salt);
                    let target =
                        PrivacyAmplifier::target_length(key.len(), information.secret_fraction());
                    amplifier.amplify(key, target, &salt)
                });
                tracing::debug!(
                    seed,
                    qber,
                    final_key_length = result.final_key_length,
                    distilled = result.distilled_key_length(),
                    "Run secure"
                );
            }
            Err(violation) => {
                machine.advance(ProtocolState::Aborted);
                tracing::debug!(seed, violation = %violation, "Run aborted: QBER above threshold");
                result.outcome = Outcome::Aborted(AbortReason::QberExceeded(violation));
            }
        }

        result.final_state = machine.state();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ErrorEstimate;
    use crate::generator::{BasisChoice, PreparedBit};

    fn protocol() -> Protocol {
        Protocol::default()
    }

    fn run(config: &RunConfig) -> RunResult {
        protocol().run_once(config).unwrap()
    }

    #[test]
    fn test_clean_channel_is_secure() {
        let config = RunConfig::with_bit_count(200).seed(42);
        let result = run(&config);

        assert_eq!(result.qber, Some(0.0));
        assert!(result.secure);
        assert_eq!(result.outcome, Outcome::Secure);
        assert_eq!(result.final_state, ProtocolState::Secure);

        let estimate = result.estimate.unwrap();
        assert_eq!(result.final_key_length, result.sifted_length - estimate.sample_size);
        assert!(result.final_key_length > 0);
        assert_eq!(result.distilled_key_length(), result.final_key_length);
        assert_eq!(result.mutual_info_ab(), Some(1.0));
        assert_eq!(result.mutual_info_ae_bound(), Some(0.0));
        assert!((result.secret_key_rate() - result.sifting_efficiency).abs() < 1e-12);
    }

    #[test]
    fn test_identical_config_identical_result() {
        let config = RunConfig::with_bit_count(500).noise(0.05).seed(7);
        assert_eq!(run(&config), run(&config));

        let config = RunConfig::with_bit_count(500).eavesdropper(true).seed(7);
        assert_eq!(run(&config), run(&config));
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = run(&RunConfig::with_bit_count(500).seed(1));
        let b = run(&RunConfig::with_bit_count(500).seed(2));
        assert_ne!(
            a.distilled_key.unwrap().as_bytes(),
            b.distilled_key.unwrap().as_bytes()
        );
    }

    #[test]
    fn test_recorded_seed_reproduces_run() {
        let first = run(&RunConfig::with_bit_count(300));
        assert_eq!(first.config.random_seed, Some(first.seed));

        let replay = run(&first.config);
        assert_eq!(first, replay);
    }

    #[test]
    fn test_single_qubit_is_insufficient_data() {
        for fraction in [0.5, 1.0] {
            for seed in 0..20 {
                let config = RunConfig::with_bit_count(1)
                    .sample_fraction(fraction)
                    .seed(seed);
                let result = run(&config);

                assert!(result.sifted_length <= 1);
                assert!(result.is_insufficient_data(), "seed {seed}");
                assert!(!result.secure);
                assert_eq!(result.final_key_length, 0);
                assert_eq!(result.final_state, ProtocolState::Aborted);
                assert_eq!(result.qber, None);
                assert!(result.distilled_key.is_none());
            }
        }
    }

    #[test]
    fn test_min_sample_size_one_accepts_single_bit_sample() {
        let mut estimated = 0;
        for seed in 0..20 {
            let config = RunConfig {
                min_sample_size: 1,
                ..RunConfig::with_bit_count(1).sample_fraction(1.0).seed(seed)
            };
            let result = run(&config);

            if result.sifted_length == 1 {
                estimated += 1;
                assert!(!result.is_insufficient_data(), "seed {seed}");
                assert_eq!(result.estimate.map(|e| e.sample_size), Some(1));
                assert_eq!(result.qber, Some(0.0));
            } else {
                assert!(result.is_insufficient_data(), "seed {seed}");
            }
        }
        assert!(estimated > 0);
    }

    #[test]
    fn test_eavesdropper_detected_by_qber() {
        let trials = 50;
        let mut qber_sum = 0.0;
        let mut aborted = 0;

        for seed in 0..trials {
            let config = RunConfig::with_bit_count(200).eavesdropper(true).seed(seed);
            let result = run(&config);

            qber_sum += result.qber.unwrap();
            if let Some(AbortReason::QberExceeded(_)) = result.abort_reason() {
                aborted += 1;
                assert_eq!(result.final_key_length, 0);
                assert!(result.sifted_length > 0);
            }
        }

        let mean = qber_sum / trials as f64;
        assert!((mean - 0.25).abs() < 0.05, "mean qber = {mean}");
        assert!(aborted >= 45, "aborted = {aborted}");
    }

    #[test]
    fn test_invalid_config_is_error() {
        let config = RunConfig::with_bit_count(0);
        assert!(matches!(
            protocol().run_once(&config),
            Err(ProtocolError::Config(ConfigError::InvalidBitCount))
        ));
    }

    /// Flips every outcome; no eavesdropper flag is set anywhere.
    #[derive(Debug)]
    struct InvertingChannel;

    impl QuantumChannel for InvertingChannel {
        fn transmit(
            &self,
            sent: PreparedBit,
            receiver_basis: BasisChoice,
            _conditions: &ChannelConditions,
            _rng: &mut dyn RngCore,
        ) -> bool {
            if sent.basis == receiver_basis {
                !sent.value
            } else {
                sent.value
            }
        }
    }

    #[test]
    fn test_detection_comes_from_statistics_only() {
        let protocol = Protocol::new(InvertingChannel);
        let result = protocol
            .run_once(&RunConfig::with_bit_count(200).seed(3))
            .unwrap();

        assert_eq!(result.qber, Some(1.0));
        assert!(matches!(
            result.outcome,
            Outcome::Aborted(AbortReason::QberExceeded(_))
        ));
        assert_eq!(result.final_key_length, 0);
    }

    #[test]
    fn test_threshold_zero_aborts_any_error() {
        let config = RunConfig::with_bit_count(1000)
            .noise(0.2)
            .threshold(0.0)
            .seed(5);
        let result = run(&config);

        assert!(!result.secure);
        assert!(matches!(
            result.estimate,
            Some(ErrorEstimate { mismatch_count, .. }) if mismatch_count > 0
        ));
    }

    #[test]
    fn test_amplification_can_be_disabled() {
        let result = protocol()
            .with_amplifier(None)
            .run_once(&RunConfig::with_bit_count(200).seed(9))
            .unwrap();

        assert!(result.secure);
        assert!(result.distilled_key.is_none());
        assert!(result.final_key_length > 0);
    }

    #[test]
    fn test_noisy_secure_run_shrinks_key() {
        let config = RunConfig::with_bit_count(4000)
            .noise(0.03)
            .seed(11);
        let result = run(&config);

        assert!(result.secure, "qber = {:?}", result.qber);
        assert!(result.distilled_key_length() < result.final_key_length);
    }
}
