use crate::errors::AegisResult;

/// Completion + embedding service.
///
/// No retry/backoff is specified: callers treat any error as "no usable
/// output" and degrade locally.
pub trait ICompletionProvider: Send + Sync {
    /// Embed a single text, returning a vector of floats.
    fn embed(&self, text: &str) -> AegisResult<Vec<f32>>;

    /// One free-form completion call.
    fn complete(&self, prompt: &str) -> AegisResult<String>;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider is currently available.
    fn is_available(&self) -> bool;
}
