//! Error types for the normalizer application.
//! Consolidates the errors of configuration, connection and the migration run.

/// A required setting is absent or unparsable. Raised before any connection
/// is attempted.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] normalizer_repository::RepositoryError),
    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] normalizer_pipeline::errors::OrchestratorError),
    #[error("Tracing initialization error: {0}")]
    Tracing(String),
}
