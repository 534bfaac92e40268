//! Domain models shared across the workspace.

mod control;
mod persist;
mod profile;
mod reply;
mod retrieval;
mod risk;
mod session;

pub use control::{CandidateControl, ConfirmedControl, ControlDomain};
pub use persist::{ControlWriteFailure, PersistReport};
pub use profile::UserProfile;
pub use reply::WorkflowReply;
pub use retrieval::{
    CorpusEntry, CoverageStat, FusedContext, ItemPayload, RetrievalSource, RetrievedItem,
    UsageAggregate,
};
pub use risk::{Risk, Severity};
pub use session::{SelectionSession, SessionStatus, WorkflowSnapshot};
