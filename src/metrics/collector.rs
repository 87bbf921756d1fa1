//! Metrics collection and registry.

use crate::montecarlo::BatchStatistics;
use prometheus::{Encoder, Gauge, IntCounter, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus metrics registry for protocol batches.
pub struct MetricsRegistry {
    registry: Registry,

    // Run counters
    runs_total: IntCounter,
    aborts_total: IntCounter,
    insufficient_data_total: IntCounter,

    // Latest batch figures
    abort_rate: Gauge,
    qber_mean: Gauge,
    qber_std_dev: Gauge,
    sifting_efficiency_mean: Gauge,
    final_key_length_mean: Gauge,
    secret_key_rate_mean: Gauge,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all protocol metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let runs_total = IntCounter::new("bb84_runs_total", "Total protocol runs completed")?;
        let aborts_total = IntCounter::new(
            "bb84_aborts_total",
            "Total runs that ended aborted, for any reason",
        )?;
        let insufficient_data_total = IntCounter::new(
            "bb84_insufficient_data_total",
            "Total runs aborted because the sifted key was too short",
        )?;

        let abort_rate = Gauge::new("bb84_abort_rate", "Abort rate of the latest batch")?;
        let qber_mean = Gauge::new("bb84_qber_mean", "Mean QBER of the latest batch")?;
        let qber_std_dev = Gauge::new(
            "bb84_qber_std_dev",
            "Standard deviation of QBER in the latest batch",
        )?;
        let sifting_efficiency_mean = Gauge::new(
            "bb84_sifting_efficiency_mean",
            "Mean fraction of raw qubits kept after sifting",
        )?;
        let final_key_length_mean = Gauge::new(
            "bb84_final_key_length_mean",
            "Mean final key length in bits",
        )?;
        let secret_key_rate_mean = Gauge::new(
            "bb84_secret_key_rate_mean",
            "Mean secret key rate in bits per raw qubit",
        )?;

        registry.register(Box::new(runs_total.clone()))?;
        registry.register(Box::new(aborts_total.clone()))?;
        registry.register(Box::new(insufficient_data_total.clone()))?;
        registry.register(Box::new(abort_rate.clone()))?;
        registry.register(Box::new(qber_mean.clone()))?;
        registry.register(Box::new(qber_std_dev.clone()))?;
        registry.register(Box::new(sifting_efficiency_mean.clone()))?;
        registry.register(Box::new(final_key_length_mean.clone()))?;
        registry.register(Box::new(secret_key_rate_mean.clone()))?;

        Ok(Self {
            registry,
            runs_total,
            aborts_total,
            insufficient_data_total,
            abort_rate,
            qber_mean,
            qber_std_dev,
            sifting_efficiency_mean,
            final_key_length_mean,
            secret_key_rate_mean,
        })
    }

    /// Records one finished batch.
    ///
    /// Counters accumulate across batches; gauges show the latest batch.
    pub fn record_batch(&self, stats: &BatchStatistics) {
        self.runs_total.inc_by(stats.completed_runs as u64);
        self.aborts_total.inc_by(stats.aborted_runs as u64);
        self.insufficient_data_total
            .inc_by(stats.insufficient_data_runs as u64);

        self.abort_rate.set(stats.abort_rate);
        // QBER gauges keep their previous value when no run produced a QBER
        if let Some(mean) = stats.qber_mean {
            self.qber_mean.set(mean);
        }
        if let Some(std_dev) = stats.qber_std_dev {
            self.qber_std_dev.set(std_dev);
        }
        self.sifting_efficiency_mean
            .set(stats.sifting_efficiency_mean);
        self.final_key_length_mean.set(stats.final_key_length_mean);
        self.secret_key_rate_mean.set(stats.secret_key_rate_mean);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
