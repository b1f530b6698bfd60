//! # Normalizer Shared
//! This crate defines the shared data structures used across the normalizer workspace.
//! It includes the declarative description of every nested-attribute category, the
//! destination table definitions, and the value types produced by extraction.
pub mod catalog;
pub mod types;

pub use catalog::company_catalog;
