//! BB84 Quantum Key Distribution Simulator
//!
//! A simulation and security-analysis engine for the BB84 protocol.
//! Models preparation, transmission over a noisy channel with an optional
//! intercept-resend eavesdropper, sifting, error estimation, the abort
//! decision and information-theoretic key rate bounds.
//!
//! # Architecture
//!
//! Each run follows an explicit data flow:
//!
//! ```text
//! generator → channel → sifting → analysis (estimation → threshold → information)
//!                                      ↓
//!                               amplification (secure runs only)
//!
//! montecarlo: many independent runs → batch statistics → metrics
//! ```
//!
//! # Design Principles
//!
//! - **Aborts are outcomes**: a run that detects eavesdropping returns a
//!   result, it does not fail
//! - **Fail-closed**: no key is reported unless the QBER passed the threshold
//! - **Reproducible**: a fixed seed determines every random choice of a run
//! - **Uses standard primitives**: ChaCha20 for randomness, BLAKE3/SHA-256
//!   for privacy amplification
//! - **No cryptographic claims**: the eavesdropper bound is a configurable
//!   policy, not a composable security proof
//!
//! # Example
//!
//! ```no_run
//! use bb84_sim::{config::RunConfig, montecarlo::run_batch, protocol::run_once};
//!
//! let config = RunConfig::with_bit_count(1000).noise(0.02).seed(42);
//!
//! let result = run_once(&config).unwrap();
//! println!("secure: {}, qber: {:?}", result.secure, result.qber);
//!
//! let stats = run_batch(&config.eavesdropper(true), 100).unwrap();
//! println!("abort rate: {:.2}", stats.abort_rate);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod amplification;
pub mod analysis;
pub mod channel;
pub mod config;
pub mod generator;
pub mod metrics;
pub mod montecarlo;
pub mod protocol;
pub mod sifting;

// Re-export commonly used types at crate root
pub use amplification::{DistilledKey, HashAlgorithm, PrivacyAmplifier};
pub use analysis::{
    binary_entropy, ErrorEstimator, InformationAnalyzer, InformationReport, SecurityDecider,
};
pub use channel::{ChannelConditions, EavesdropperModel, QuantumChannel, SimulatedChannel};
pub use config::{ConfigError, FileConfig, RunConfig};
pub use generator::{BasisChoice, RandomSequenceGenerator};
pub use metrics::MetricsRegistry;
pub use montecarlo::{run_batch, BatchStatistics, MonteCarloRunner, SeedStrategy};
pub use protocol::{run_once, AbortReason, Outcome, Protocol, ProtocolError, RunResult};
pub use sifting::{sift, SiftedKey};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
