//! Hash-based privacy amplification.
//!
//! Compresses a partially leaked key into a shorter one about which the
//! eavesdropper knows essentially nothing. The extractor is a salted
//! cryptographic hash sized to the secret fraction left by the
//! information analysis.

use blake3::Hasher as Blake3Hasher;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Domain separator for the extractor.
const AMPLIFICATION_DOMAIN: &[u8] = b"bb84-sim-privacy-amplification-v1";

/// Supported hash algorithms for amplification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// BLAKE3 keyed XOF - fast, recommended default.
    #[default]
    Blake3,
    /// SHA-256 in counter mode - conservative choice.
    Sha256,
}

/// Key material after privacy amplification.
#[derive(Clone, PartialEq, Eq)]
pub struct DistilledKey {
    /// Packed bits, least significant bit first; unused tail bits are zero.
    data: Vec<u8>,
    bit_length: usize,
}

impl DistilledKey {
    /// Returns the packed key bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the key length in bits.
    #[inline]
    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    /// Returns true if no secret bits could be distilled.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bit_length == 0
    }

    /// Unpacks the key into individual bits.
    pub fn bits(&self) -> Vec<bool> {
        self.data
            .iter()
            .flat_map(|&byte| (0..8).map(move |i| byte & (1 << i) != 0))
            .take(self.bit_length)
            .collect()
    }
}

impl std::fmt::Debug for DistilledKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistilledKey")
            .field("bit_length", &self.bit_length)
            .finish_non_exhaustive()
    }
}

/// Packs bits into bytes, least significant bit first.
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | ((bit as u8) << i))
        })
        .collect()
}

/// Salted hash extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivacyAmplifier {
    algorithm: HashAlgorithm,
}

impl PrivacyAmplifier {
    /// Creates an amplifier with the specified algorithm.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Returns the configured algorithm.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Secret bits extractable from `key_length` bits at `secret_fraction`.
    pub fn target_length(key_length: usize, secret_fraction: f64) -> usize {
        let fraction = secret_fraction.clamp(0.0, 1.0);
        ((key_length as f64 * fraction).floor() as usize).min(key_length)
    }

    /// Compresses `key` to `target_bits` bits under `salt`.
    ///
    /// The output never exceeds the input length.
    pub fn amplify(&self, key: &[bool], target_bits: usize, salt: &[u8; 32]) -> DistilledKey {
        let bit_length = target_bits.min(key.len());
        let packed = pack_bits(key);
        let mut data = vec![0u8; bit_length.div_ceil(8)];

        match self.algorithm {
            HashAlgorithm::Blake3 => {
                let mut hasher = Blake3Hasher::new_keyed(salt);
                hasher.update(AMPLIFICATION_DOMAIN);
                hasher.update(&(key.len() as u64).to_le_bytes());
                hasher.update(&packed);
                hasher.finalize_xof().fill(&mut data);
            }
            HashAlgorithm::Sha256 => {
                for (counter, block) in data.chunks_mut(32).enumerate() {
                    let mut hasher = Sha256::new();
                    hasher.update(AMPLIFICATION_DOMAIN);
                    hasher.update(salt);
                    hasher.update((counter as u64).to_le_bytes());
                    hasher.update((key.len() as u64).to_le_bytes());
                    hasher.update(&packed);
                    let digest = hasher.finalize();
                    block.copy_from_slice(&digest[..block.len()]);
                }
            }
        }

        let tail = bit_length % 8;
        if tail != 0 {
            if let Some(last) = data.last_mut() {
                *last &= (1u8 << tail) - 1;
            }
        }

        tracing::trace!(
            input_bits = key.len(),
            output_bits = bit_length,
            algorithm = ?self.algorithm,
            "Privacy amplification applied"
        );

        DistilledKey { data, bit_length }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_key(len: usize) -> Vec<bool> {
        (0..len).map(|i| (i * 7 + 3) % 5 < 2).collect()
    }

    #[test]
    fn test_pack_bits_lsb_first() {
        assert_eq!(pack_bits(&[true, false, false, false]), vec![0x01]);
        assert_eq!(
            pack_bits(&[false, false, false, false, false, false, false, true, true]),
            vec![0x80, 0x01]
        );
        assert!(pack_bits(&[]).is_empty());
    }

    #[test]
    fn test_target_length() {
        assert_eq!(PrivacyAmplifier::target_length(100, 0.5), 50);
        assert_eq!(PrivacyAmplifier::target_length(100, 0.0), 0);
        assert_eq!(PrivacyAmplifier::target_length(10, 0.99), 9);
        assert_eq!(PrivacyAmplifier::target_length(10, 2.0), 10);
    }

    #[test]
    fn test_blake3_output_length() {
        let amplifier = PrivacyAmplifier::new(HashAlgorithm::Blake3);
        let key = amplifier.amplify(&sample_key(200), 77, &[0x11; 32]);

        assert_eq!(key.bit_length(), 77);
        assert_eq!(key.as_bytes().len(), 10);
        assert_eq!(key.bits().len(), 77);
        assert_eq!(key.as_bytes()[9] & !0x1F, 0);
    }

    #[test]
    fn test_sha256_multi_block() {
        let amplifier = PrivacyAmplifier::new(HashAlgorithm::Sha256);
        let key = amplifier.amplify(&sample_key(1000), 600, &[0x22; 32]);

        assert_eq!(key.bit_length(), 600);
        assert_eq!(key.as_bytes().len(), 75);
        assert_ne!(&key.as_bytes()[..32], &key.as_bytes()[32..64]);
    }

    #[test]
    fn test_never_longer_than_input() {
        let key = PrivacyAmplifier::default().amplify(&sample_key(16), 64, &[0; 32]);
        assert_eq!(key.bit_length(), 16);
    }

    #[test]
    fn test_salt_changes_output() {
        let amplifier = PrivacyAmplifier::default();
        let input = sample_key(256);

        let a = amplifier.amplify(&input, 128, &[0xAA; 32]);
        let b = amplifier.amplify(&input, 128, &[0xBB; 32]);
        let c = amplifier.amplify(&input, 128, &[0xAA; 32]);

        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_algorithms_differ() {
        let input = sample_key(256);
        let a = PrivacyAmplifier::new(HashAlgorithm::Blake3).amplify(&input, 128, &[1; 32]);
        let b = PrivacyAmplifier::new(HashAlgorithm::Sha256).amplify(&input, 128, &[1; 32]);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_debug_hides_key() {
        let key = PrivacyAmplifier::default().amplify(&sample_key(64), 32, &[0; 32]);
        let rendered = format!("{key:?}");
        assert!(rendered.contains("bit_length: 32"));
        assert!(!rendered.contains("data"));
    }
}
