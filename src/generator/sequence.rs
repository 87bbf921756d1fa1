//! Random bit values and basis choices for Alice and Bob.

use super::seed::{stream_rng, Stream};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Measurement / preparation basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasisChoice {
    /// Z basis: |0>, |1>.
    Rectilinear,
    /// X basis: |+>, |->.
    Diagonal,
}

impl BasisChoice {
    /// Draws a uniformly random basis.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            BasisChoice::Diagonal
        } else {
            BasisChoice::Rectilinear
        }
    }
}

/// A bit Alice encodes into a qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreparedBit {
    pub value: bool,
    pub basis: BasisChoice,
}

/// Bob's measurement outcome and the basis he measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservedBit {
    pub value: bool,
    pub basis: BasisChoice,
}

/// Produces independent uniform bits and bases for both parties.
///
/// Alice and Bob draw from separate streams, so Bob's basis choices are
/// independent of Alice's by construction.
pub struct RandomSequenceGenerator {
    alice: ChaCha20Rng,
    bob: ChaCha20Rng,
}

impl RandomSequenceGenerator {
    /// Creates a generator for the run identified by `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            alice: stream_rng(seed, Stream::Alice),
            bob: stream_rng(seed, Stream::Bob),
        }
    }

    /// Draws Alice's `count` bit values and preparation bases.
    pub fn prepare_alice(&mut self, count: usize) -> Vec<PreparedBit> {
        (0..count)
            .map(|_| PreparedBit {
                value: self.alice.gen_bool(0.5),
                basis: BasisChoice::random(&mut self.alice),
            })
            .collect()
    }

    /// Draws Bob's `count` measurement bases.
    pub fn choose_bob_bases(&mut self, count: usize) -> Vec<BasisChoice> {
        (0..count)
            .map(|_| BasisChoice::random(&mut self.bob))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lengths_match_request() {
        let mut generator = RandomSequenceGenerator::from_seed(1);
        assert_eq!(generator.prepare_alice(128).len(), 128);
        assert_eq!(generator.choose_bob_bases(64).len(), 64);
        assert!(generator.prepare_alice(0).is_empty());
    }

    #[test]
    fn test_reproducible_from_seed() {
        let mut a = RandomSequenceGenerator::from_seed(99);
        let mut b = RandomSequenceGenerator::from_seed(99);

        assert_eq!(a.prepare_alice(256), b.prepare_alice(256));
        assert_eq!(a.choose_bob_bases(256), b.choose_bob_bases(256));
    }

    #[test]
    fn test_roughly_uniform() {
        let mut generator = RandomSequenceGenerator::from_seed(5);
        let bits = generator.prepare_alice(4000);

        let ones = bits.iter().filter(|b| b.value).count() as f64 / 4000.0;
        let diagonal = bits
            .iter()
            .filter(|b| b.basis == BasisChoice::Diagonal)
            .count() as f64
            / 4000.0;

        assert!((ones - 0.5).abs() < 0.05);
        assert!((diagonal - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_bob_independent_of_alice() {
        let mut generator = RandomSequenceGenerator::from_seed(11);
        let alice = generator.prepare_alice(4000);
        let bob = generator.choose_bob_bases(4000);

        let agree = alice
            .iter()
            .zip(&bob)
            .filter(|(a, b)| a.basis == **b)
            .count() as f64
            / 4000.0;

        assert!((agree - 0.5).abs() < 0.05);
    }
}
