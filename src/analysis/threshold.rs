//! QBER threshold policy.
//!
//! The abort decision is a fixed threshold on the observed QBER. The
//! bound is inclusive: a QBER exactly equal to the threshold proceeds.
//! That tie-break is a policy choice, not physics.

use crate::config::DEFAULT_SECURITY_THRESHOLD;
use serde::{Deserialize, Serialize};

/// Outcome of the security check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// QBER within tolerance; keep the key.
    Proceed,
    /// QBER too high; discard everything.
    Abort,
}

/// Decides whether a run may proceed. `qber <= threshold` proceeds.
pub fn decide(qber: f64, threshold: f64) -> Decision {
    if qber <= threshold {
        Decision::Proceed
    } else {
        Decision::Abort
    }
}

/// Stateless QBER threshold check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecurityDecider {
    /// Maximum tolerated QBER (inclusive).
    pub threshold: f64,
}

impl Default for SecurityDecider {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SECURITY_THRESHOLD,
        }
    }
}

impl SecurityDecider {
    /// Creates a decider with the given threshold.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Applies the threshold to `qber`.
    pub fn decide(&self, qber: f64) -> Decision {
        decide(qber, self.threshold)
    }

    /// Like [`SecurityDecider::decide`], but reports the violation on abort.
    pub fn check(&self, qber: f64) -> Result<(), ThresholdViolation> {
        match self.decide(qber) {
            Decision::Proceed => Ok(()),
            Decision::Abort => Err(ThresholdViolation {
                observed: qber,
                threshold: self.threshold,
            }),
        }
    }
}

/// Observed QBER above the abort threshold.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("QBER {observed:.4} exceeds threshold {threshold:.4}")]
pub struct ThresholdViolation {
    pub observed: f64,
    pub threshold: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tie_proceeds() {
        assert_eq!(decide(0.11, 0.11), Decision::Proceed);
    }

    #[test]
    fn test_just_above_aborts() {
        assert_eq!(decide(0.1100001, 0.11), Decision::Abort);
    }

    #[test]
    fn test_zero_qber_proceeds() {
        assert_eq!(SecurityDecider::default().decide(0.0), Decision::Proceed);
        assert_eq!(decide(0.0, 0.0), Decision::Proceed);
    }

    #[test]
    fn test_intercept_resend_rate_aborts() {
        let decider = SecurityDecider::default();
        assert_eq!(decider.decide(0.25), Decision::Abort);
        assert!(matches!(
            decider.check(0.25),
            Err(ThresholdViolation { observed, threshold }) if observed == 0.25 && threshold == 0.11
        ));
    }

    #[test]
    fn test_nan_aborts() {
        assert_eq!(decide(f64::NAN, 0.11), Decision::Abort);
    }
}
