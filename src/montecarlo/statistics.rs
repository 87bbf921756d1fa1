//! Batch statistics over many runs.
//!
//! Accumulation keeps only counts, sums and sums of squares, so partial
//! accumulators merge commutatively and a batch can be reduced in any
//! grouping.

use crate::protocol::RunResult;
use serde::{Deserialize, Serialize};

/// Running count, sum and sum of squares of a sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    count: u64,
    sum: f64,
    sum_sq: f64,
}

impl Moments {
    /// Adds one observation.
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        self.sum += x;
        self.sum_sq += x * x;
    }

    /// Combines two partial accumulations.
    pub fn merge(self, other: Moments) -> Moments {
        Moments {
            count: self.count + other.count,
            sum: self.sum + other.sum,
            sum_sq: self.sum_sq + other.sum_sq,
        }
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sample mean, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// Population standard deviation, `None` when empty.
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let variance = self.sum_sq / self.count as f64 - mean * mean;
        Some(variance.max(0.0).sqrt())
    }
}

/// Aggregated statistics of a Monte Carlo batch.
///
/// QBER figures cover only runs that produced a QBER; every other figure
/// covers all completed runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    /// Runs the caller asked for.
    pub requested_runs: usize,
    /// Runs actually executed (fewer if the batch was stopped early).
    pub completed_runs: usize,
    /// Runs that produced a QBER.
    pub qber_samples: usize,
    pub qber_mean: Option<f64>,
    pub qber_std_dev: Option<f64>,
    pub sifting_efficiency_mean: f64,
    pub sifting_efficiency_std_dev: f64,
    pub final_key_length_mean: f64,
    pub final_key_length_std_dev: f64,
    pub secret_key_rate_mean: f64,
    /// Runs that ended aborted, for any reason.
    pub aborted_runs: usize,
    /// Aborted runs whose reason was insufficient data.
    pub insufficient_data_runs: usize,
    /// `aborted_runs / completed_runs`.
    pub abort_rate: f64,
}

/// Reduces run results into [`BatchStatistics`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatisticsAccumulator {
    runs: usize,
    aborted: usize,
    insufficient: usize,
    qber: Moments,
    efficiency: Moments,
    final_key_length: Moments,
    secret_key_rate: Moments,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one run.
    pub fn push(&mut self, result: &RunResult) {
        self.runs += 1;
        if !result.secure {
            self.aborted += 1;
        }
        if result.is_insufficient_data() {
            self.insufficient += 1;
        }
        if let Some(qber) = result.qber {
            self.qber.push(qber);
        }
        self.efficiency.push(result.sifting_efficiency);
        self.final_key_length.push(result.final_key_length as f64);
        self.secret_key_rate.push(result.secret_key_rate());
    }

    /// Combines two partial accumulators.
    pub fn merge(self, other: StatisticsAccumulator) -> StatisticsAccumulator {
        StatisticsAccumulator {
            runs: self.runs + other.runs,
            aborted: self.aborted + other.aborted,
            insufficient: self.insufficient + other.insufficient,
            qber: self.qber.merge(other.qber),
            efficiency: self.efficiency.merge(other.efficiency),
            final_key_length: self.final_key_length.merge(other.final_key_length),
            secret_key_rate: self.secret_key_rate.merge(other.secret_key_rate),
        }
    }

    /// Number of runs accumulated so far.
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Produces the final statistics.
    pub fn finish(&self, requested_runs: usize) -> BatchStatistics {
        let abort_rate = if self.runs == 0 {
            0.0
        } else {
            self.aborted as f64 / self.runs as f64
        };

        BatchStatistics {
            requested_runs,
            completed_runs: self.runs,
            qber_samples: self.qber.count() as usize,
            qber_mean: self.qber.mean(),
            qber_std_dev: self.qber.std_dev(),
            sifting_efficiency_mean: self.efficiency.mean().unwrap_or(0.0),
            sifting_efficiency_std_dev: self.efficiency.std_dev().unwrap_or(0.0),
            final_key_length_mean: self.final_key_length.mean().unwrap_or(0.0),
            final_key_length_std_dev: self.final_key_length.std_dev().unwrap_or(0.0),
            secret_key_rate_mean: self.secret_key_rate.mean().unwrap_or(0.0),
            aborted_runs: self.aborted,
            insufficient_data_runs: self.insufficient,
            abort_rate,
        }
    }
}

impl<'a> FromIterator<&'a RunResult> for StatisticsAccumulator {
    fn from_iter<I: IntoIterator<Item = &'a RunResult>>(iter: I) -> Self {
        let mut acc = StatisticsAccumulator::new();
        for result in iter {
            acc.push(result);
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moments_basic() {
        let mut m = Moments::default();
        assert_eq!(m.mean(), None);
        assert_eq!(m.std_dev(), None);

        for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            m.push(x);
        }
        assert_eq!(m.mean(), Some(5.0));
        assert_eq!(m.std_dev(), Some(2.0));
    }

    #[test]
    fn test_moments_merge_matches_push() {
        let values = [0.25, 0.5, 0.125, 1.0, 0.0, 0.75];

        let mut whole = Moments::default();
        values.iter().for_each(|&x| whole.push(x));

        let mut left = Moments::default();
        let mut right = Moments::default();
        values[..2].iter().for_each(|&x| left.push(x));
        values[2..].iter().for_each(|&x| right.push(x));

        assert_eq!(left.merge(right), whole);
        assert_eq!(right.merge(left), whole);
    }

    #[test]
    fn test_constant_sample_zero_spread() {
        let mut m = Moments::default();
        for _ in 0..10 {
            m.push(0.1);
        }
        assert!(m.std_dev().unwrap() < 1e-6);
    }

    #[test]
    fn test_empty_accumulator() {
        let stats = StatisticsAccumulator::new().finish(5);
        assert_eq!(stats.requested_runs, 5);
        assert_eq!(stats.completed_runs, 0);
        assert_eq!(stats.qber_mean, None);
        assert_eq!(stats.abort_rate, 0.0);
    }
}
