//! Terminal result of a protocol run.

use super::state::ProtocolState;
use crate::amplification::DistilledKey;
use crate::analysis::{ErrorEstimate, InformationReport, InsufficientData, ThresholdViolation};
use crate::config::RunConfig;

/// Why a run was aborted.
///
/// The two variants must stay distinct: a short key says nothing about
/// an eavesdropper.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum AbortReason {
    #[error("no statistics available: {0}")]
    InsufficientData(InsufficientData),
    #[error("possible eavesdropping: {0}")]
    QberExceeded(ThresholdViolation),
}

/// Terminal outcome of a run. An abort is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Secure,
    Aborted(AbortReason),
}

/// Immutable record of one completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// Configuration that produced this result, with the seed actually used.
    pub config: RunConfig,
    /// Seed the run's random streams were derived from.
    pub seed: u64,
    pub outcome: Outcome,
    /// True only for [`Outcome::Secure`].
    pub secure: bool,
    /// State the run terminated in.
    pub final_state: ProtocolState,
    /// Bits surviving sifting.
    pub sifted_length: usize,
    /// `sifted_length / bit_count`.
    pub sifting_efficiency: f64,
    /// Disclosed-sample statistics, absent on insufficient data.
    pub estimate: Option<ErrorEstimate>,
    /// Observed QBER, absent on insufficient data.
    pub qber: Option<f64>,
    /// Undisclosed sifted bits kept as key; zero whenever aborted.
    pub final_key_length: usize,
    /// Information bounds, absent on insufficient data.
    pub information: Option<InformationReport>,
    /// Key after privacy amplification, secure runs only.
    pub distilled_key: Option<DistilledKey>,
}

impl RunResult {
    /// Returns the abort reason, if the run aborted.
    pub fn abort_reason(&self) -> Option<&AbortReason> {
        match &self.outcome {
            Outcome::Secure => None,
            Outcome::Aborted(reason) => Some(reason),
        }
    }

    /// Returns true if the run aborted for lack of data.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self.outcome,
            Outcome::Aborted(AbortReason::InsufficientData(_))
        )
    }

    /// `I(A:B)`, when a QBER was available.
    pub fn mutual_info_ab(&self) -> Option<f64> {
        self.information.map(|i| i.mutual_info_ab)
    }

    /// `I(A:E)` bound, when a QBER was available.
    pub fn mutual_info_ae_bound(&self) -> Option<f64> {
        self.information.map(|i| i.mutual_info_ae_bound)
    }

    /// Secret key rate; zero when no QBER was available.
    pub fn secret_key_rate(&self) -> f64 {
        self.information.map_or(0.0, |i| i.secret_key_rate)
    }

    /// Length of the distilled key in bits.
    pub fn distilled_key_length(&self) -> usize {
        self.distilled_key.as_ref().map_or(0, DistilledKey::bit_length)
    }
}
