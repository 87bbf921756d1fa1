//! Deterministic random streams derived from a run seed.
//!
//! A run seed is expanded into independent ChaCha20 streams, one per
//! protocol stage. Each stream key is BLAKE3 over:
//! - a domain separator
//! - the 64-bit run seed
//! - the stream label
//!
//! Stages therefore never share RNG state, and adding draws to one stage
//! cannot shift the output of another.

use blake3::Hasher;
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};

/// Domain separator for per-stage streams.
const STREAM_DOMAIN: &[u8] = b"bb84-sim-stream-v1";

/// Domain separator for batch seed derivation.
const BATCH_DOMAIN: &[u8] = b"bb84-sim-batch-v1";

/// Protocol stages that own an independent random stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Alice's bit values and bases.
    Alice,
    /// Bob's measurement bases.
    Bob,
    /// Channel noise and eavesdropper choices.
    Channel,
    /// Positions disclosed for error estimation.
    Sampling,
    /// Privacy amplification salt.
    Amplification,
}

impl Stream {
    fn label(self) -> &'static [u8] {
        match self {
            Stream::Alice => b"alice",
            Stream::Bob => b"bob",
            Stream::Channel => b"channel",
            Stream::Sampling => b"sampling",
            Stream::Amplification => b"amplification",
        }
    }
}

/// Builds the ChaCha20 stream for `stream` under `seed`.
pub fn stream_rng(seed: u64, stream: Stream) -> ChaCha20Rng {
    let mut hasher = Hasher::new();
    hasher.update(STREAM_DOMAIN);
    hasher.update(&seed.to_le_bytes());
    hasher.update(stream.label());
    ChaCha20Rng::from_seed(*hasher.finalize().as_bytes())
}

/// Derives the seed of run `index` within a batch.
pub fn derive_run_seed(batch_seed: u64, index: u64) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(BATCH_DOMAIN);
    hasher.update(&batch_seed.to_le_bytes());
    hasher.update(&index.to_le_bytes());

    let mut out = [0u8; 8];
    out.copy_from_slice(&hasher.finalize().as_bytes()[..8]);
    u64::from_le_bytes(out)
}

/// Draws a fresh seed from the OS entropy source.
pub fn os_seed() -> u64 {
    OsRng.next_u64()
}
