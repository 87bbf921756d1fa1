//! Prometheus metrics for Monte Carlo batches.
//!
//! # Metrics Exposed
//!
//! ## Counters (accumulate across batches)
//! - `bb84_runs_total` - Completed protocol runs
//! - `bb84_aborts_total` - Runs that ended aborted
//! - `bb84_insufficient_data_total` - Runs aborted for lack of data
//!
//! ## Gauges (latest batch)
//! - `bb84_abort_rate` - Fraction of aborted runs
//! - `bb84_qber_mean` / `bb84_qber_std_dev` - QBER distribution
//! - `bb84_sifting_efficiency_mean` - Fraction of qubits kept by sifting
//! - `bb84_final_key_length_mean` - Final key length in bits
//! - `bb84_secret_key_rate_mean` - Secret bits per raw qubit
//!
//! # Example
//!
//! ```no_run
//! use bb84_sim::{config::RunConfig, metrics::MetricsRegistry, montecarlo::run_batch};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! let stats = run_batch(&RunConfig::default(), 100).expect("batch failed");
//!
//! registry.record_batch(&stats);
//! println!("{}", registry.encode().expect("encode failed"));
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry};
