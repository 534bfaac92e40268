//! # aegis-core
//!
//! Foundation crate for the Aegis control-generation engine.
//! Defines all models, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod intent;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::AegisConfig;
pub use errors::{AegisError, AegisResult};
pub use intent::Intent;
pub use models::{
    CandidateControl, ConfirmedControl, ControlDomain, FusedContext, PersistReport,
    RetrievalSource, RetrievedItem, Risk, SelectionSession, SessionStatus, Severity, UserProfile,
    WorkflowReply, WorkflowSnapshot,
};
