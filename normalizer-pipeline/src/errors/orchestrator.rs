//! Error types for the orchestrator module of the normalizer pipeline.
//! Defines specific errors that can occur while running the migration phases.
use normalizer_repository::RepositoryError;
use thiserror::Error;

use crate::errors::SchemaError;

/// Represents errors that can occur within the migration orchestrator.
///
/// Every variant names the phase that was rolled back.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Schema phase failed: {0}")]
    Schema(#[from] SchemaError),
    #[error("Phase {phase} failed: {source}")]
    Phase {
        phase: String,
        #[source]
        source: RepositoryError,
    },
}

impl OrchestratorError {
    pub fn phase(&self) -> &str {
        match self {
            OrchestratorError::Schema(_) => crate::orchestrator::SCHEMA_PHASE,
            OrchestratorError::Phase { phase, .. } => phase,
        }
    }
}
