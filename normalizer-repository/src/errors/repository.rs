//! Error types for the migration repository.
//! Defines specific errors that can occur while talking to the relational store.
use thiserror::Error;

/// Represents errors that can occur within the migration repository.
///
/// This enum consolidates the failure modes of every store operation, from
/// SQLx errors to missing tables and columns detected by the in-memory store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Table not found: {0}")]
    MissingTable(String),

    #[error("Column not found: {table}.{column}")]
    MissingColumn { table: String, column: String },

    #[error("Dimension row in {table} vanished between insert and lookup")]
    DimensionVanished { table: String },

    #[error("Store rejected write to {table}: {reason}")]
    WriteRejected { table: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store state lock poisoned")]
    LockPoisoned,
}
