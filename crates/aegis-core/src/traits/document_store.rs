use crate::errors::AegisResult;
use crate::models::{ConfirmedControl, Risk, UserProfile};

/// The canonical record store. Keyed upserts plus the field filters the
/// workflow needs. All upserts are idempotent by identifier.
pub trait IDocumentStore: Send + Sync {
    // --- Controls ---
    fn upsert_control(&self, control: &ConfirmedControl) -> AegisResult<()>;
    fn get_control(&self, id: &str) -> AegisResult<Option<ConfirmedControl>>;
    fn controls_by_risk(&self, risk_id: &str, user_id: &str) -> AegisResult<Vec<ConfirmedControl>>;
    fn controls_by_user(&self, user_id: &str) -> AegisResult<Vec<ConfirmedControl>>;
    fn controls_by_category(&self, category: &str, user_id: &str)
        -> AegisResult<Vec<ConfirmedControl>>;
    fn controls_by_reference_prefix(
        &self,
        prefix: &str,
        user_id: &str,
    ) -> AegisResult<Vec<ConfirmedControl>>;

    /// Literal substring match against title, description, and
    /// implementation-guidance fields, across all users.
    fn search_controls_text(&self, query: &str, limit: usize)
        -> AegisResult<Vec<ConfirmedControl>>;

    // --- Risks (written by the external intake process; read-mostly here) ---
    fn upsert_risk(&self, risk: &Risk) -> AegisResult<()>;
    fn get_risk(&self, risk_id: &str, user_id: &str) -> AegisResult<Option<Risk>>;
    /// All risks for a user; with `exclude_covered`, only risks that have
    /// no confirmed controls yet.
    fn risks_by_user(&self, user_id: &str, exclude_covered: bool) -> AegisResult<Vec<Risk>>;

    // --- Profiles ---
    fn upsert_profile(&self, profile: &UserProfile) -> AegisResult<()>;
    fn get_profile(&self, user_id: &str) -> AegisResult<Option<UserProfile>>;
}
