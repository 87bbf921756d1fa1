//! Shannon information bounds and secret key rate.
//!
//! All quantities are functions of the QBER plus the sifting efficiency:
//!
//! ```text
//! I(A:B)        = 1 - H(qber)
//! I(A:E)_bound  = policy(qber)          (intercept-resend: H(qber))
//! rate          = efficiency * max(0, I(A:B) - I(A:E)_bound)
//! ```
//!
//! The eavesdropper bound is a swappable [`LeakageBound`] so that other
//! attack models can be plugged in without touching the analyzer.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

/// Domain errors for information quantities.
///
/// These indicate a defect in the caller: inputs are never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InformationError {
    #[error("QBER {0} outside [0, 1]")]
    QberOutOfRange(f64),
    #[error("sifting efficiency {0} outside [0, 1]")]
    EfficiencyOutOfRange(f64),
}

fn check_probability(p: f64) -> Result<(), InformationError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(InformationError::QberOutOfRange(p))
    }
}

/// Binary Shannon entropy in bits.
///
/// `H(0) = H(1) = 0` by continuity; `0 * log2(0)` is never evaluated.
pub fn binary_entropy(p: f64) -> Result<f64, InformationError> {
    check_probability(p)?;
    if p == 0.0 || p == 1.0 {
        return Ok(0.0);
    }
    let q = 1.0 - p;
    Ok(-p * p.log2() - q * q.log2())
}

/// Upper bound on the eavesdropper's information per sifted bit.
pub trait LeakageBound: Debug + Send + Sync {
    /// Short identifier for logs and reports.
    fn name(&self) -> &'static str;

    /// `I(A:E)` bound for an observed QBER.
    ///
    /// A QBER outside [0, 1] is an error, never clamped.
    fn eavesdropper_information(&self, qber: f64) -> Result<f64, InformationError>;
}

/// Intercept-resend bound: `I(A:E) <= H(qber)`.
///
/// Exact for the intercept-resend attack class; a modeling assumption,
/// not a bound against general attacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterceptResendBound;

impl LeakageBound for InterceptResendBound {
    fn name(&self) -> &'static str {
        "intercept-resend"
    }

    fn eavesdropper_information(&self, qber: f64) -> Result<f64, InformationError> {
        binary_entropy(qber)
    }
}

/// Information quantities for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InformationReport {
    pub qber: f64,
    pub sifting_efficiency: f64,
    /// `1 - H(qber)`.
    pub mutual_info_ab: f64,
    /// Eavesdropper information bound under the active policy.
    pub mutual_info_ae_bound: f64,
    /// Secret bits per raw qubit.
    pub secret_key_rate: f64,
}

impl InformationReport {
    /// Secret bits per sifted bit, before scaling by efficiency.
    pub fn secret_fraction(&self) -> f64 {
        (self.mutual_info_ab - self.mutual_info_ae_bound).max(0.0)
    }
}

/// Computes information bounds under a leakage policy.
#[derive(Debug, Clone)]
pub struct InformationAnalyzer {
    bound: Arc<dyn LeakageBound>,
}

impl Default for InformationAnalyzer {
    fn default() -> Self {
        Self::new(InterceptResendBound)
    }
}

impl InformationAnalyzer {
    /// Creates an analyzer using `bound` for the eavesdropper term.
    pub fn new(bound: impl LeakageBound + 'static) -> Self {
        Self {
            bound: Arc::new(bound),
        }
    }

    /// Name of the active leakage policy.
    pub fn bound_name(&self) -> &'static str {
        self.bound.name()
    }

    /// `I(A:B) = 1 - H(qber)`.
    pub fn mutual_info_ab(&self, qber: f64) -> Result<f64, InformationError> {
        Ok(1.0 - binary_entropy(qber)?)
    }

    /// Eavesdropper information bound at `qber`.
    pub fn mutual_info_ae_bound(&self, qber: f64) -> Result<f64, InformationError> {
        check_probability(qber)?;
        self.bound.eavesdropper_information(qber)
    }

    /// `efficiency * max(0, I(A:B) - I(A:E))`.
    pub fn secret_key_rate(&self, qber: f64, efficiency: f64) -> Result<f64, InformationError> {
        Ok(self.analyze(qber, efficiency)?.secret_key_rate)
    }

    /// Computes every quantity for one run.
    pub fn analyze(&self, qber: f64, efficiency: f64) -> Result<InformationReport, InformationError> {
        if !(0.0..=1.0).contains(&efficiency) {
            return Err(InformationError::EfficiencyOutOfRange(efficiency));
        }
        let mutual_info_ab = self.mutual_info_ab(qber)?;
        let mutual_info_ae_bound = self.mutual_info_ae_bound(qber)?;
        let secret_key_rate = efficiency * (mutual_info_ab - mutual_info_ae_bound).max(0.0);

        Ok(InformationReport {
            qber,
            sifting_efficiency: efficiency,
            mutual_info_ab,
            mutual_info_ae_bound,
            secret_key_rate,
        })
    }
}
