//! Quantum channel collaborator.
//!
//! This module provides the seam between the protocol engine and
//! whatever simulates the physical channel, plus the statistical
//! simulator used by default.

mod eavesdropper;
mod simulator;

pub use eavesdropper::{ChannelConditions, EavesdropperModel};
pub use simulator::{QuantumChannel, SimulatedChannel};
