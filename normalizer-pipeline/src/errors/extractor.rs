//! Error types for the extractor module of the normalizer pipeline.
//! Defines the ways a payload or one of its entries can fail to be coerced.
use thiserror::Error;

/// A payload or payload entry that cannot be turned into a field-set.
///
/// These never abort a phase: the orchestrator skips the offending entry,
/// counts it and moves on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Payload is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("Expected {expected} payload, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },
    #[error("Entry {ordinal}, field {column}: {reason}")]
    InvalidField {
        ordinal: i32,
        column: &'static str,
        reason: String,
    },
    #[error("Payload has more entries than an ordinal can address")]
    TooManyEntries,
}
