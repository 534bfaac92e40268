//! In-memory session store backed by `DashMap`, for embedded use and tests.

use dashmap::DashMap;

use aegis_core::errors::{AegisResult, StoreError};
use aegis_core::models::{SelectionSession, SessionStatus};
use aegis_core::traits::ISessionStore;

/// Thread-safe in-memory session store. `claim` is atomic because the
/// status check and flip happen under the shard lock of `get_mut`.
pub struct MemorySessionStore {
    sessions: DashMap<String, SelectionSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ISessionStore for MemorySessionStore {
    fn save(&self, session: &SelectionSession) -> AegisResult<()> {
        self.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    fn get(&self, session_id: &str) -> AegisResult<Option<SelectionSession>> {
        Ok(self.sessions.get(session_id).map(|r| r.clone()))
    }

    fn claim(&self, session_id: &str) -> AegisResult<bool> {
        let Some(mut entry) = self.sessions.get_mut(session_id) else {
            return Err(StoreError::SessionNotFound {
                session_id: session_id.to_string(),
            }
            .into());
        };
        if entry.status == SessionStatus::Stored {
            return Ok(false);
        }
        entry.status = SessionStatus::Stored;
        Ok(true)
    }

    fn remove(&self, session_id: &str) -> AegisResult<()> {
        self.sessions.remove(session_id);
        Ok(())
    }

    fn session_ids(&self) -> AegisResult<Vec<String>> {
        Ok(self.sessions.iter().map(|r| r.key().clone()).collect())
    }
}
