//! Basis reconciliation.
//!
//! After transmission Alice and Bob publish their bases over the
//! classical channel and keep only the positions where they agree.
//! Sifting is a pure filter: no randomness, no side effects.

mod key;

pub use key::SiftedKey;

use crate::generator::{ObservedBit, PreparedBit};
use thiserror::Error;

/// Errors raised while sifting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiftingError {
    #[error("sequence length mismatch: alice has {alice} bits, bob has {bob}")]
    LengthMismatch { alice: usize, bob: usize },
}

/// Keeps the positions where Alice's and Bob's bases agree.
pub fn sift(alice: &[PreparedBit], bob: &[ObservedBit]) -> Result<SiftedKey, SiftingError> {
    if alice.len() != bob.len() {
        return Err(SiftingError::LengthMismatch {
            alice: alice.len(),
            bob: bob.len(),
        });
    }

    let mut alice_bits = Vec::with_capacity(alice.len() / 2);
    let mut bob_bits = Vec::with_capacity(alice.len() / 2);
    let mut positions = Vec::with_capacity(alice.len() / 2);

    for (i, (a, b)) in alice.iter().zip(bob).enumerate() {
        if a.basis == b.basis {
            alice_bits.push(a.value);
            bob_bits.push(b.value);
            positions.push(i);
        }
    }

    tracing::trace!(
        raw = alice.len(),
        sifted = positions.len(),
        "Sifted key"
    );

    Ok(SiftedKey::new(alice_bits, bob_bits, positions))
}

/// Alice's bit values at the basis-matched positions, in order.
pub fn sift_values(alice: &[PreparedBit], bob: &[ObservedBit]) -> Result<Vec<bool>, SiftingError> {
    sift(alice, bob).map(|key| key.alice().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{BasisChoice, RandomSequenceGenerator};
    use proptest::prelude::*;

    const R: BasisChoice = BasisChoice::Rectilinear;
    const D: BasisChoice = BasisChoice::Diagonal;

    fn prepared(value: bool, basis: BasisChoice) -> PreparedBit {
        PreparedBit { value, basis }
    }

    fn observed(value: bool, basis: BasisChoice) -> ObservedBit {
        ObservedBit { value, basis }
    }

    #[test]
    fn test_keeps_matching_bases_in_order() {
        let alice = [
            prepared(true, R),
            prepared(false, D),
            prepared(true, D),
            prepared(false, R),
        ];
        let bob = [
            observed(true, R),
            observed(true, R),
            observed(false, D),
            observed(false, R),
        ];

        let key = sift(&alice, &bob).unwrap();

        assert_eq!(key.alice(), &[true, true, false]);
        assert_eq!(key.bob(), &[true, false, false]);
        assert_eq!(key.positions(), &[0, 2, 3]);
        assert_eq!(sift_values(&alice, &bob).unwrap(), vec![true, true, false]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let alice = [prepared(true, R)];
        let result = sift(&alice, &[]);
        assert_eq!(
            result,
            Err(SiftingError::LengthMismatch { alice: 1, bob: 0 })
        );
    }

    #[test]
    fn test_empty_input() {
        let key = sift(&[], &[]).unwrap();
        assert!(key.is_empty());
    }

    #[test]
    fn test_efficiency_converges_to_half() {
        let mut generator = RandomSequenceGenerator::from_seed(2000);
        let alice = generator.prepare_alice(2000);
        let bob: Vec<ObservedBit> = generator
            .choose_bob_bases(2000)
            .into_iter()
            .map(|basis| observed(false, basis))
            .collect();

        let key = sift(&alice, &bob).unwrap();
        let efficiency = key.efficiency(2000);
        assert!((efficiency - 0.5).abs() <= 0.05, "efficiency = {efficiency}");
    }

    fn arb_basis() -> impl Strategy<Value = BasisChoice> {
        prop_oneof![Just(R), Just(D)]
    }

    proptest! {
        #[test]
        fn prop_sifted_length_bounded(
            pairs in prop::collection::vec((any::<bool>(), arb_basis(), any::<bool>(), arb_basis()), 0..300)
        ) {
            let alice: Vec<_> = pairs.iter().map(|p| prepared(p.0, p.1)).collect();
            let bob: Vec<_> = pairs.iter().map(|p| observed(p.2, p.3)).collect();

            let key = sift(&alice, &bob).unwrap();
            let expected = pairs.iter().filter(|p| p.1 == p.3).count();

            prop_assert!(key.len() <= pairs.len());
            prop_assert_eq!(key.len(), expected);
            prop_assert!(key.positions().windows(2).all(|w| w[0] < w[1]));
        }
    }
}
