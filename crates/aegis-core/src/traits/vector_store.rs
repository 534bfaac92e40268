use crate::errors::AegisResult;
use crate::models::{CandidateControl, Risk};

/// Similarity index. Upsert-by-key with an embedding column; approximate
/// nearest-neighbor reads return a distance-derived cosine similarity in
/// [0,1], descending. Advisory: rebuildable from the document store.
pub trait IVectorStore: Send + Sync {
    fn upsert_control_embedding(
        &self,
        control: &CandidateControl,
        embedding: &[f32],
    ) -> AegisResult<()>;

    fn upsert_risk_embedding(&self, risk: &Risk, embedding: &[f32]) -> AegisResult<()>;

    /// Top-K controls across all users.
    fn search_controls(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> AegisResult<Vec<(CandidateControl, f64)>>;

    /// Top-K controls confirmed by one user.
    fn search_user_controls(
        &self,
        user_id: &str,
        embedding: &[f32],
        limit: usize,
    ) -> AegisResult<Vec<(CandidateControl, f64)>>;

    /// Top-K similar risks.
    fn search_risks(&self, embedding: &[f32], limit: usize) -> AegisResult<Vec<(Risk, f64)>>;
}
