//! # aegis-inference
//!
//! `ICompletionProvider` backends. The workflow talks to one provider; in
//! production that is a `ProviderChain` (remote HTTP first, deterministic
//! hashing embedder as the embedding fallback) wrapped in an embedding
//! cache.

mod cache;
mod chain;
mod hashing;
mod openai;

pub use cache::CachedProvider;
pub use chain::ProviderChain;
pub use hashing::HashingEmbedder;
pub use openai::OpenAiProvider;
