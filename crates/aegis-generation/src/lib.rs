//! # aegis-generation
//!
//! The generation step: build a context block from the risk, the
//! organization profile, and the fused retrieval context; invoke the
//! completion service once per risk; tolerantly parse the structured
//! response; repair and validate every candidate before it reaches the
//! user.

mod context;
mod parser;
mod repair;
mod step;

pub use context::build_context_block;
pub use parser::{parse_candidates, RawCandidate};
pub use repair::repair_candidates;
pub use step::GenerationStep;
