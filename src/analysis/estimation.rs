//! QBER estimation by public comparison of a random sample.
//!
//! A fraction of the sifted key is disclosed over the classical channel
//! and compared. Disclosed bits are gone for good: the usable key is
//! whatever was not sampled.

use crate::config::RunConfig;
use crate::sifting::SiftedKey;
use rand::seq::index;
use rand::Rng;
use thiserror::Error;

/// Result of comparing the disclosed sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorEstimate {
    /// Number of disclosed positions.
    pub sample_size: usize,
    /// Disclosed positions where Alice and Bob disagree.
    pub mismatch_count: usize,
    /// `mismatch_count / sample_size`.
    pub qber: f64,
}

/// Estimate plus the key material left after disclosure.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimation {
    pub estimate: ErrorEstimate,
    /// Sifted bits that were not disclosed.
    pub remaining: SiftedKey,
}

/// The sifted key is too short to yield a QBER.
///
/// This is not evidence of an eavesdropper; callers must keep it apart
/// from a threshold violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("insufficient data: {sifted_length} sifted bits give a sample of {sample_size}, need at least {minimum}")]
pub struct InsufficientData {
    pub sifted_length: usize,
    pub sample_size: usize,
    pub minimum: usize,
}

/// Samples the sifted key and computes the observed error rate.
#[derive(Debug, Clone, Copy)]
pub struct ErrorEstimator {
    sample_fraction: f64,
    min_sample_size: usize,
}

impl ErrorEstimator {
    /// Creates an estimator disclosing `sample_fraction` of the key.
    pub fn new(sample_fraction: f64, min_sample_size: usize) -> Self {
        Self {
            sample_fraction,
            min_sample_size: min_sample_size.max(1),
        }
    }

    /// Creates an estimator from a validated run configuration.
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.sample_fraction, config.min_sample_size)
    }

    /// Number of positions disclosed from a key of `sifted_length` bits.
    ///
    /// Rounds half to even, so a single sifted bit at fraction 0.5
    /// yields an empty sample.
    pub fn sample_size(&self, sifted_length: usize) -> usize {
        let size = (self.sample_fraction * sifted_length as f64).round_ties_even() as usize;
        size.min(sifted_length)
    }

    /// Discloses a uniformly random sample without replacement.
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        key: &SiftedKey,
        rng: &mut R,
    ) -> Result<Estimation, InsufficientData> {
        let sifted_length = key.len();
        let sample_size = self.sample_size(sifted_length);

        if sifted_length == 0 || sample_size < self.min_sample_size {
            return Err(InsufficientData {
                sifted_length,
                sample_size,
                minimum: self.min_sample_size,
            });
        }

        let mut disclosed = vec![false; sifted_length];
        for i in index::sample(rng, sifted_length, sample_size).into_iter() {
            disclosed[i] = true;
        }

        let mut mismatch_count = 0;
        let mut alice = Vec::with_capacity(sifted_length - sample_size);
        let mut bob = Vec::with_capacity(sifted_length - sample_size);
        let mut positions = Vec::with_capacity(sifted_length - sample_size);

        for (i, &is_disclosed) in disclosed.iter().enumerate() {
            let (a, b) = (key.alice()[i], key.bob()[i]);
            if is_disclosed {
                if a != b {
                    mismatch_count += 1;
                }
            } else {
                alice.push(a);
                bob.push(b);
                positions.push(key.positions()[i]);
            }
        }

        let qber = mismatch_count as f64 / sample_size as f64;

        tracing::trace!(
            sifted = sifted_length,
            sample_size,
            mismatch_count,
            qber,
            "Estimated QBER"
        );

        Ok(Estimation {
            estimate: ErrorEstimate {
                sample_size,
                mismatch_count,
                qber,
            },
            remaining: SiftedKey::new(alice, bob, positions),
        })
    }
}
