//! Selection-session lifecycle: an in-memory [`ISessionStore`] backend and
//! a manager that creates, loads, claims and sweeps sessions over any
//! backend.
//!
//! [`ISessionStore`]: aegis_core::traits::ISessionStore

mod manager;
mod memory_store;

pub use manager::SessionManager;
pub use memory_store::MemorySessionStore;
