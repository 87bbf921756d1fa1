//! Privacy amplification of the final key.
//!
//! Runs that end secure hand their undisclosed key to a hash extractor,
//! which shrinks it to the length the information analysis allows.

mod hash;

pub use hash::{pack_bits, DistilledKey, HashAlgorithm, PrivacyAmplifier};
