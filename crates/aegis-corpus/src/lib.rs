//! # aegis-corpus
//!
//! The static reference corpus: an ISO 27001:2022 Annex A catalog queryable
//! by reference, domain, risk category, or free-text keyword heuristics.

mod catalog;
pub mod keywords;

pub use catalog::ReferenceCatalog;
