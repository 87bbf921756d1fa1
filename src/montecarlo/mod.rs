//! Monte Carlo validation across many independent runs.
//!
//! Runs share a configuration but no mutable state; the batch reduces
//! their immutable results into summary statistics.

mod runner;
mod statistics;

pub use runner::{MonteCarloRunner, SeedStrategy, SweepPoint};
pub use statistics::{BatchStatistics, Moments, StatisticsAccumulator};

use crate::channel::SimulatedChannel;
use crate::config::RunConfig;
use crate::protocol::ProtocolError;

/// Runs `run_count` independent protocol runs over the simulated channel.
pub fn run_batch(config: &RunConfig, run_count: usize) -> Result<BatchStatistics, ProtocolError> {
    MonteCarloRunner::<SimulatedChannel>::default().run(config, run_count)
}

/// Runs one batch per noise level over the simulated channel.
pub fn sweep_noise(
    config: &RunConfig,
    levels: &[f64],
    run_count: usize,
) -> Result<Vec<SweepPoint>, ProtocolError> {
    MonteCarloRunner::<SimulatedChannel>::default().sweep_noise(config, levels, run_count)
}
