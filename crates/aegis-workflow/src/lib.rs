//! # aegis-workflow
//!
//! The conversational risk-to-control workflow: intent classification,
//! the suspend/resume state machine, multi-store persistence
//! coordination, and response synthesis.
//!
//! Entry point is [`WorkflowEngine::run`], which takes a query, a user
//! id, and optionally a session id plus a selection to resume a paused
//! session.

mod classify;
mod engine;
mod machine;
mod persist;
mod synthesize;

pub use classify::classify;
pub use engine::WorkflowEngine;
pub use machine::{Machine, WorkflowState};
pub use persist::PersistenceCoordinator;
