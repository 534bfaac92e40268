use crate::errors::AegisResult;
use crate::models::{ConfirmedControl, CoverageStat, Risk, UsageAggregate, UserProfile};

/// Relationship store. Upsert-by-key node/edge creation plus the ranked
/// aggregate reads the workflow uses. Advisory: rebuildable from the
/// document store.
pub trait IGraphStore: Send + Sync {
    // --- Nodes ---
    fn upsert_user(&self, profile: &UserProfile) -> AegisResult<()>;
    fn upsert_risk_node(&self, risk: &Risk) -> AegisResult<()>;
    /// Create a minimal Risk node when the full record is unavailable.
    /// No-op if the node already exists.
    fn ensure_risk_stub(&self, risk_id: &str, user_id: &str) -> AegisResult<()>;
    fn upsert_control_node(&self, control: &ConfirmedControl) -> AegisResult<()>;

    // --- Edges (idempotent by endpoint pair) ---
    fn link_mitigates(&self, control_id: &str, risk_id: &str) -> AegisResult<()>;
    fn link_selected(&self, user_id: &str, control_id: &str) -> AegisResult<()>;

    // --- Aggregates ---
    /// Controls used most often by organizations in `domain` against risks
    /// of `category`, ranked by usage count.
    fn top_controls_for(
        &self,
        domain: &str,
        category: &str,
        limit: usize,
    ) -> AegisResult<Vec<UsageAggregate>>;

    /// Per-category risk/control coverage for one user.
    fn coverage_stats(&self, user_id: &str) -> AegisResult<Vec<CoverageStat>>;
}
