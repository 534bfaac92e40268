//! # aegis-retrieval
//!
//! The context fusion engine: gathers candidate controls from four
//! independently fault-tolerant sources, merges them in strict priority
//! order with first-wins dedup, and tags every survivor with provenance
//! and relevance.

mod engine;
pub mod guard;
mod merge;

pub use engine::ContextFusionEngine;
pub use merge::merge_by_priority;
