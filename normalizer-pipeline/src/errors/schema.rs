//! Error types for the schema module of the normalizer pipeline.
use normalizer_repository::RepositoryError;
use thiserror::Error;

/// Represents errors that prevent the target schema from being put in place.
///
/// Any of these is fatal: no data phase runs without a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Owner table {table} does not exist and no staging table was found")]
    MissingOwnerTable { table: String },
    #[error("Owner table {table} has no identifier column {column}")]
    MissingIdentifier { table: String, column: String },
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
