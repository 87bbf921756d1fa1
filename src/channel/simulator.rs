//! Quantum channel abstraction.
//!
//! The protocol engine never touches quantum states. It hands a prepared
//! bit to a channel and gets back the bit the receiver observed. The
//! trait lets a circuit-backed simulator replace the statistical one
//! without any change to the engine.

use super::eavesdropper::{ChannelConditions, EavesdropperModel};
use crate::generator::{BasisChoice, PreparedBit};
use rand::Rng;
use rand_core::RngCore;

/// Trait for quantum channel implementations.
///
/// Implementations must be stateless between calls: all randomness comes
/// from the `rng` argument, which keeps runs independent and reproducible.
pub trait QuantumChannel: Send + Sync {
    /// Sends one qubit and returns the receiver's measured bit.
    ///
    /// Contract:
    /// - noiseless, unattacked, matching bases: the sent value arrives
    /// - noise flips the outcome with `noise_probability`, independent of bases
    /// - an enabled eavesdropper reproduces intercept-resend statistics
    fn transmit(
        &self,
        sent: PreparedBit,
        receiver_basis: BasisChoice,
        conditions: &ChannelConditions,
        rng: &mut dyn RngCore,
    ) -> bool;
}

/// Statistical channel with depolarizing noise and intercept-resend attack.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedChannel;

impl SimulatedChannel {
    pub fn new() -> Self {
        Self
    }
}

/// Measures a basis state: deterministic in its own basis, a fair coin otherwise.
fn measure(state: PreparedBit, basis: BasisChoice, rng: &mut dyn RngCore) -> bool {
    if state.basis == basis {
        state.value
    } else {
        rng.gen_bool(0.5)
    }
}

fn intercept_resend(
    state: PreparedBit,
    model: &EavesdropperModel,
    rng: &mut dyn RngCore,
) -> PreparedBit {
    if !rng.gen_bool(model.intercept_fraction()) {
        return state;
    }
    let basis = BasisChoice::random(rng);
    PreparedBit {
        value: measure(state, basis, rng),
        basis,
    }
}

impl QuantumChannel for SimulatedChannel {
    fn transmit(
        &self,
        sent: PreparedBit,
        receiver_basis: BasisChoice,
        conditions: &ChannelConditions,
        rng: &mut dyn RngCore,
    ) -> bool {
        let arriving = match conditions.eavesdropper() {
            Some(model) => intercept_resend(sent, model, rng),
            None => sent,
        };

        let outcome = measure(arriving, receiver_basis, rng);

        if rng.gen_bool(conditions.noise_probability()) {
            !outcome
        } else {
            outcome
        }
    }
}
