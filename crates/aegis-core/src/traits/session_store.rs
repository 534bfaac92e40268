use crate::errors::AegisResult;
use crate::models::SelectionSession;

/// Durable store for selection sessions.
///
/// `claim` is the at-most-once gate: a compare-and-set on the session
/// status that exactly one caller can win. Implementations must make the
/// check-and-flip atomic.
pub trait ISessionStore: Send + Sync {
    fn save(&self, session: &SelectionSession) -> AegisResult<()>;
    fn get(&self, session_id: &str) -> AegisResult<Option<SelectionSession>>;

    /// Atomically flip `Pending → Stored`. Returns `true` when this caller
    /// won the flip, `false` when the session was already resolved.
    /// Unknown sessions are an error, not a lost race.
    fn claim(&self, session_id: &str) -> AegisResult<bool>;

    fn remove(&self, session_id: &str) -> AegisResult<()>;
    fn session_ids(&self) -> AegisResult<Vec<String>>;
}
