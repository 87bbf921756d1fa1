//! Protocol run state machine.
//!
//! ```text
//! Init → Prepared → Transmitted → Sifted → Estimated → Secure
//!                                    ↓          ↓
//!                                 Aborted    Aborted
//! ```

use serde::{Deserialize, Serialize};

/// Stage of a single protocol run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolState {
    /// Nothing generated yet.
    Init,
    /// Alice's bits and both parties' bases drawn.
    Prepared,
    /// Every qubit has crossed the channel.
    Transmitted,
    /// Basis-mismatched positions discarded.
    Sifted,
    /// QBER computed from the disclosed sample.
    Estimated,
    /// QBER within threshold; final key retained.
    Secure,
    /// Run abandoned; no key survives.
    Aborted,
}

impl ProtocolState {
    /// Returns true if `next` is a legal successor of this state.
    pub fn can_advance_to(self, next: ProtocolState) -> bool {
        use ProtocolState::*;
        matches!(
            (self, next),
            (Init, Prepared)
                | (Prepared, Transmitted)
                | (Transmitted, Sifted)
                | (Sifted, Estimated)
                | (Sifted, Aborted)
                | (Estimated, Secure)
                | (Estimated, Aborted)
        )
    }

    /// Returns true for `Secure` and `Aborted`.
    pub fn is_terminal(self) -> bool {
        matches!(self, ProtocolState::Secure | ProtocolState::Aborted)
    }
}

/// Tracks the state of one run and logs each transition.
#[derive(Debug)]
pub(crate) struct RunStateMachine {
    state: ProtocolState,
    seed: u64,
}

impl RunStateMachine {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            state: ProtocolState::Init,
            seed,
        }
    }

    pub(crate) fn state(&self) -> ProtocolState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: ProtocolState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!(
            seed = self.seed,
            from = ?self.state,
            to = ?next,
            "Protocol state transition"
        );
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ProtocolState::*;

    const ALL: [ProtocolState; 7] = [
        Init,
        Prepared,
        Transmitted,
        Sifted,
        Estimated,
        Secure,
        Aborted,
    ];

    #[test]
    fn test_happy_path_is_legal() {
        let path = [Init, Prepared, Transmitted, Sifted, Estimated, Secure];
        assert!(path.windows(2).all(|w| w[0].can_advance_to(w[1])));
    }

    #[test]
    fn test_abort_only_after_sifting() {
        assert!(Sifted.can_advance_to(Aborted));
        assert!(Estimated.can_advance_to(Aborted));
        assert!(!Init.can_advance_to(Aborted));
        assert!(!Transmitted.can_advance_to(Aborted));
        assert!(!Sifted.can_advance_to(Secure));
    }

    #[test]
    fn test_terminal_states_have_no_successor() {
        for terminal in [Secure, Aborted] {
            assert!(terminal.is_terminal());
            assert!(ALL.iter().all(|&next| !terminal.can_advance_to(next)));
        }
        assert!(!Estimated.is_terminal());
    }

    #[test]
    fn test_machine_tracks_state() {
        let mut machine = RunStateMachine::new(1);
        assert_eq!(machine.state(), Init);
        machine.advance(Prepared);
        machine.advance(Transmitted);
        assert_eq!(machine.state(), Transmitted);
    }
}
