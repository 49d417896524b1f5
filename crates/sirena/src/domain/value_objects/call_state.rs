//! CallState - Lifecycle of a single call through the engine

use serde::{Deserialize, Serialize};

/// Per-call state machine
///
/// `Received -> Classified -> Routed -> Persisted -> Notified`, with
/// `NotifiedWithWarnings` as the alternate terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    Received,
    Classified,
    Routed,
    Persisted,
    Notified,
    NotifiedWithWarnings,
}

impl CallState {
    fn step(&self) -> u8 {
        match self {
            CallState::Received => 0,
            CallState::Classified => 1,
            CallState::Routed => 2,
            CallState::Persisted => 3,
            CallState::Notified | CallState::NotifiedWithWarnings => 4,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CallState::Notified | CallState::NotifiedWithWarnings)
    }

    /// Whether `next` is the immediate successor of this state
    pub fn can_advance_to(&self, next: CallState) -> bool {
        !self.is_terminal() && next.step() == self.step() + 1
    }
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallState::Received => write!(f, "received"),
            CallState::Classified => write!(f, "classified"),
            CallState::Routed => write!(f, "routed"),
            CallState::Persisted => write!(f, "persisted"),
            CallState::Notified => write!(f, "notified"),
            CallState::NotifiedWithWarnings => write!(f, "notified_with_warnings"),
        }
    }
}
