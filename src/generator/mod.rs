//! Random sequence generation.
//!
//! Every random draw in a run comes from a stream derived from the run
//! seed, which makes a run with a fixed seed reproducible bit for bit.

mod seed;
mod sequence;

pub use seed::{derive_run_seed, os_seed, stream_rng, Stream};
pub use sequence::{BasisChoice, ObservedBit, PreparedBit, RandomSequenceGenerator};
