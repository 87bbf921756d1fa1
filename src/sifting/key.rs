//! Index-aligned key material kept after sifting.

/// Alice's and Bob's bits at the positions where their bases agreed.
///
/// Both sides are index-aligned: `alice()[i]` and `bob()[i]` came from
/// the same qubit, at raw position `positions()[i]`.
#[derive(Clone, PartialEq, Eq)]
pub struct SiftedKey {
    alice: Vec<bool>,
    bob: Vec<bool>,
    positions: Vec<usize>,
}

impl SiftedKey {
    pub(crate) fn new(alice: Vec<bool>, bob: Vec<bool>, positions: Vec<usize>) -> Self {
        debug_assert_eq!(alice.len(), bob.len());
        debug_assert_eq!(alice.len(), positions.len());
        Self {
            alice,
            bob,
            positions,
        }
    }

    /// Alice's sifted bits.
    #[inline]
    pub fn alice(&self) -> &[bool] {
        &self.alice
    }

    /// Bob's sifted bits.
    #[inline]
    pub fn bob(&self) -> &[bool] {
        &self.bob
    }

    /// Raw qubit positions that survived sifting.
    #[inline]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Returns the number of sifted bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.alice.len()
    }

    /// Returns true if no position survived.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.alice.is_empty()
    }

    /// Counts positions where Alice and Bob disagree.
    pub fn mismatch_count(&self) -> usize {
        self.alice
            .iter()
            .zip(&self.bob)
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Fraction of `bit_count` raw qubits that survived sifting.
    pub fn efficiency(&self, bit_count: usize) -> f64 {
        if bit_count == 0 {
            return 0.0;
        }
        self.len() as f64 / bit_count as f64
    }
}

impl std::fmt::Debug for SiftedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiftedKey")
            .field("len", &self.len())
            .field("mismatches", &self.mismatch_count())
            .finish_non_exhaustive()
    }
}
