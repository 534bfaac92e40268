//! Collaborator traits. One seam per external store/service, injected
//! explicitly at construction — no global singletons.

mod completion;
mod document_store;
mod graph_store;
mod session_store;
mod vector_store;

pub use completion::ICompletionProvider;
pub use document_store::IDocumentStore;
pub use graph_store::IGraphStore;
pub use session_store::ISessionStore;
pub use vector_store::IVectorStore;
