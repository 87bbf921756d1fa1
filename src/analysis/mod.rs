//! Security analysis of the sifted key.
//!
//! This module estimates the error rate from a disclosed sample,
//! applies the abort threshold, and quantifies leaked information.
//! Nothing here knows whether an eavesdropper was present: detection
//! rests on the QBER statistic alone.

mod estimation;
mod information;
mod threshold;

pub use estimation::{ErrorEstimate, ErrorEstimator, Estimation, InsufficientData};
pub use information::{
    binary_entropy, InformationAnalyzer, InformationError, InformationReport,
    InterceptResendBound, LeakageBound,
};
pub use threshold::{decide, Decision, SecurityDecider, ThresholdViolation};
