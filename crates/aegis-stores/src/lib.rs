//! # aegis-stores
//!
//! Concrete backends for the collaborator traits:
//! - [`SqliteDocumentStore`] — canonical records (controls, risks,
//!   profiles) plus durable selection sessions with a CAS claim.
//! - [`SqliteVectorStore`] — BLOB embeddings with brute-force cosine top-K.
//! - [`MemoryGraphStore`] — petgraph relationship store with usage-ranked
//!   aggregates.
//!
//! The document store is authoritative; vector and graph stores are
//! advisory caches rebuildable from it.

mod document;
mod graph;
mod vector;

pub use document::SqliteDocumentStore;
pub use graph::MemoryGraphStore;
pub use vector::SqliteVectorStore;

use aegis_core::errors::StoreError;

pub(crate) fn to_store_err(message: impl Into<String>) -> StoreError {
    StoreError::Sqlite {
        message: message.into(),
    }
}
