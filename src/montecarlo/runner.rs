//! Monte Carlo batch execution.
//!
//! Every run gets its own seed, derived from the batch seed and the run
//! index, so a batch with a fixed seed is reproducible no matter how its
//! runs are scheduled. Results are reduced by a single writer in index
//! order after all runs complete.

use super::statistics::{BatchStatistics, StatisticsAccumulator};
use crate::channel::{QuantumChannel, SimulatedChannel};
use crate::config::{ConfigError, RunConfig};
use crate::generator::{derive_run_seed, os_seed};
use crate::protocol::{Protocol, ProtocolError, RunResult};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How per-run seeds are obtained from the batch seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedStrategy {
    /// Each run hashes the batch seed with its index.
    #[default]
    Derived,
    /// Every run uses the batch seed itself (determinism checks).
    Fixed,
}

/// One point of a noise sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub noise_probability: f64,
    pub statistics: BatchStatistics,
}

/// Executes batches of independent protocol runs.
#[derive(Debug, Clone)]
pub struct MonteCarloRunner<C = SimulatedChannel> {
    protocol: Protocol<C>,
    seed_strategy: SeedStrategy,
    stop: Option<Arc<AtomicBool>>,
}

impl Default for MonteCarloRunner<SimulatedChannel> {
    fn default() -> Self {
        Self::new(Protocol::default())
    }
}

impl<C: QuantumChannel> MonteCarloRunner<C> {
    /// Creates a runner executing `protocol`.
    pub fn new(protocol: Protocol<C>) -> Self {
        Self {
            protocol,
            seed_strategy: SeedStrategy::Derived,
            stop: None,
        }
    }

    /// Sets the seed strategy.
    pub fn with_seed_strategy(mut self, strategy: SeedStrategy) -> Self {
        self.seed_strategy = strategy;
        self
    }

    /// Installs a flag that, once set, prevents further runs from starting.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    fn is_stopped(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn seed_for(&self, batch_seed: u64, index: usize) -> u64 {
        match self.seed_strategy {
            SeedStrategy::Derived => derive_run_seed(batch_seed, index as u64),
            SeedStrategy::Fixed => batch_seed,
        }
    }

    /// Executes `run_count` runs and returns every result in run order.
    ///
    /// Fails fast on invalid configuration before any run starts.
    pub fn run_results(
        &self,
        config: &RunConfig,
        run_count: usize,
    ) -> Result<Vec<RunResult>, ProtocolError> {
        config.validate()?;
        if run_count == 0 {
            return Err(ConfigError::InvalidRunCount.into());
        }

        let batch_seed = config.random_seed.unwrap_or_else(os_seed);
        tracing::debug!(batch_seed, run_count, strategy = ?self.seed_strategy, "Starting batch");

        self.execute(config, batch_seed, run_count)
    }

    #[cfg(not(feature = "parallel"))]
    fn execute(
        &self,
        config: &RunConfig,
        batch_seed: u64,
        run_count: usize,
    ) -> Result<Vec<RunResult>, ProtocolError> {
        let mut results = Vec::with_capacity(run_count);
        for index in 0..run_count {
            if self.is_stopped() {
                tracing::info!(completed = index, run_count, "Batch stopped early");
                break;
            }
            results.push(
                self.protocol
                    .run_with_seed(config, self.seed_for(batch_seed, index))?,
            );
        }
        Ok(results)
    }

    #[cfg(feature = "parallel")]
    fn execute(
        &self,
        config: &RunConfig,
        batch_seed: u64,
        run_count: usize,
    ) -> Result<Vec<RunResult>, ProtocolError> {
        let outcomes: Vec<Option<Result<RunResult, ProtocolError>>> = (0..run_count)
            .into_par_iter()
            .map(|index| {
                (!self.is_stopped()).then(|| {
                    self.protocol
                        .run_with_seed(config, self.seed_for(batch_seed, index))
                })
            })
            .collect();

        let results = outcomes
            .into_iter()
            .flatten()
            .collect::<Result<Vec<_>, _>>()?;
        if results.len() < run_count {
            tracing::info!(completed = results.len(), run_count, "Batch stopped early");
        }
        Ok(results)
    }

    /// Executes a batch and reduces it to summary statistics.
    pub fn run(&self, config: &RunConfig, run_count: usize) -> Result<BatchStatistics, ProtocolError> {
        let results = self.run_results(config, run_count)?;
        let stats = results
            .iter()
            .collect::<StatisticsAccumulator>()
            .finish(run_count);

        tracing::info!(
            runs = stats.completed_runs,
            qber_mean = ?stats.qber_mean,
            abort_rate = stats.abort_rate,
            key_length_mean = stats.final_key_length_mean,
            "Batch complete"
        );
        if stats.aborted_runs > 0 {
            tracing::warn!(
                aborted = stats.aborted_runs,
                insufficient_data = stats.insufficient_data_runs,
                "Batch contained aborted runs"
            );
        }

        Ok(stats)
    }

    /// Runs one batch per noise level, sharing the batch seed across levels.
    pub fn sweep_noise(
        &self,
        config: &RunConfig,
        levels: &[f64],
        run_count: usize,
    ) -> Result<Vec<SweepPoint>, ProtocolError> {
        let base = RunConfig {
            random_seed: Some(config.random_seed.unwrap_or_else(os_seed)),
            ..config.clone()
        };

        levels
            .iter()
            .map(|&noise_probability| {
                let statistics = self.run(&base.clone().noise(noise_probability), run_count)?;
                Ok(SweepPoint {
                    noise_probability,
                    statistics,
                })
            })
            .collect()
    }
}
