//! Session lifecycle on top of any [`ISessionStore`] backend.

use chrono::{Duration, Utc};
use tracing::{debug, info};

use aegis_core::errors::{AegisResult, StoreError};
use aegis_core::models::{CandidateControl, SelectionSession, SessionStatus, WorkflowSnapshot};
use aegis_core::traits::ISessionStore;

/// Creates, loads and claims selection sessions. Stateless itself; all
/// state lives in the backing store so any instance can resume any session.
pub struct SessionManager<'a> {
    store: &'a dyn ISessionStore,
}

impl<'a> SessionManager<'a> {
    pub fn new(store: &'a dyn ISessionStore) -> Self {
        Self { store }
    }

    /// Open a new pending session. Persisted before the id is handed out,
    /// so a returned id is always resumable.
    pub fn open(
        &self,
        user_id: &str,
        candidates: Vec<CandidateControl>,
        snapshot: WorkflowSnapshot,
    ) -> AegisResult<SelectionSession> {
        let session = SelectionSession::new(user_id, candidates, snapshot);
        self.store.save(&session)?;
        debug!(
            session_id = %session.id,
            user_id,
            candidates = session.candidates.len(),
            "opened selection session"
        );
        Ok(session)
    }

    /// Load a session, turning absence into a typed error.
    pub fn load(&self, session_id: &str) -> AegisResult<SelectionSession> {
        self.store.get(session_id)?.ok_or_else(|| {
            StoreError::SessionNotFound {
                session_id: session_id.to_string(),
            }
            .into()
        })
    }

    /// Atomically claim a pending session for resolution. `false` means
    /// another caller already resolved it.
    pub fn claim(&self, session_id: &str) -> AegisResult<bool> {
        self.store.claim(session_id)
    }

    /// Drop resolved sessions and pending sessions older than `max_age`.
    /// Returns the number removed.
    pub fn sweep(&self, max_age: Duration) -> AegisResult<usize> {
        let horizon = Utc::now() - max_age;
        let mut removed = 0;
        for id in self.store.session_ids()? {
            let Some(session) = self.store.get(&id)? else {
                continue;
            };
            let expired = session.status == SessionStatus::Stored || session.created_at < horizon;
            if expired {
                self.store.remove(&id)?;
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, "swept stale selection sessions");
        }
        Ok(removed)
    }
}
