//! The workflow state machine.
//!
//! Linear with two branch points: `Retrieving` forks on whether the intent
//! requests generation, and `AwaitingSelection` forks on whether a
//! selection was supplied. Resumption enters directly at `Persisting`.

use tracing::debug;

use aegis_core::errors::{AegisResult, WorkflowError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Classifying,
    Retrieving,
    Generating,
    AwaitingSelection,
    Persisting,
    Synthesizing,
    Done,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Classifying => "classifying",
            WorkflowState::Retrieving => "retrieving",
            WorkflowState::Generating => "generating",
            WorkflowState::AwaitingSelection => "awaiting_selection",
            WorkflowState::Persisting => "persisting",
            WorkflowState::Synthesizing => "synthesizing",
            WorkflowState::Done => "done",
        }
    }

    fn may_advance_to(&self, next: WorkflowState) -> bool {
        use WorkflowState::*;
        matches!(
            (self, next),
            (Classifying, Retrieving)
                | (Retrieving, Generating)
                | (Retrieving, Synthesizing)
                | (Generating, AwaitingSelection)
                | (AwaitingSelection, Persisting)
                | (AwaitingSelection, Synthesizing)
                | (Persisting, Synthesizing)
                | (Synthesizing, Done)
        )
    }
}

/// Tracks the current state and enforces legal transitions. A rejected
/// transition is a sequencing bug in the engine, not a user error.
pub struct Machine {
    state: WorkflowState,
}

impl Machine {
    /// Start a fresh run at `Classifying`.
    pub fn start() -> Self {
        Self {
            state: WorkflowState::Classifying,
        }
    }

    /// Resumption entry point: straight to `Persisting`, bypassing
    /// classification, retrieval and generation entirely.
    pub fn resume() -> Self {
        Self {
            state: WorkflowState::Persisting,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn advance(&mut self, next: WorkflowState) -> AegisResult<()> {
        if !self.state.may_advance_to(next) {
            return Err(WorkflowError::InvalidTransition {
                state: self.state.as_str().to_string(),
            }
            .into());
        }
        debug!(from = self.state.as_str(), to = next.as_str(), "workflow transition");
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn informational_path_skips_generation() {
        let mut m = Machine::start();
        m.advance(WorkflowState::Retrieving).unwrap();
        m.advance(WorkflowState::Synthesizing).unwrap();
        m.advance(WorkflowState::Done).unwrap();
        assert_eq!(m.state(), WorkflowState::Done);
    }

    #[test]
    fn generation_path_suspends_at_selection() {
        let mut m = Machine::start();
        m.advance(WorkflowState::Retrieving).unwrap();
        m.advance(WorkflowState::Generating).unwrap();
        m.advance(WorkflowState::AwaitingSelection).unwrap();
        m.advance(WorkflowState::Synthesizing).unwrap();
        m.advance(WorkflowState::Done).unwrap();
    }

    #[test]
    fn resumption_enters_at_persisting() {
        let mut m = Machine::resume();
        assert_eq!(m.state(), WorkflowState::Persisting);
        m.advance(WorkflowState::Synthesizing).unwrap();
        m.advance(WorkflowState::Done).unwrap();
    }

    #[test]
    fn illegal_transition_is_rejected() {
        let mut m = Machine::start();
        assert!(m.advance(WorkflowState::Persisting).is_err());
        // State is unchanged after a rejected transition.
        assert_eq!(m.state(), WorkflowState::Classifying);
    }
}
