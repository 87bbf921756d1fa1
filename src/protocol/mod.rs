//! Single-run protocol orchestration.
//!
//! A run moves through a fixed state machine and always ends in
//! `Secure` or `Aborted`. Only a secure run reports a non-empty key.

mod orchestrator;
mod result;
mod state;

pub use orchestrator::{Protocol, ProtocolError};
pub use result::{AbortReason, Outcome, RunResult};
pub use state::ProtocolState;

use crate::config::RunConfig;

/// Runs the protocol once over the simulated channel.
pub fn run_once(config: &RunConfig) -> Result<RunResult, ProtocolError> {
    Protocol::<crate::channel::SimulatedChannel>::default().run_once(config)
}
