use std::sync::Arc;

use normalizer_pipeline::orchestrator::Orchestrator;
use normalizer_repository::PostgresMigrationRepository;
use normalizer_shared::company_catalog;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::MigrationConfig;
use crate::errors::NormalizerError;

/// `Dependencies` holds the connection pool and the orchestrator wired to it.
///
/// The pool is kept alongside the orchestrator so the caller can close it once
/// the run reaches a terminal state.
pub struct Dependencies {
    pub pool: sqlx::PgPool,
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Connects to PostgreSQL and builds the orchestrator for the company catalog.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated migration configuration
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok(Self)` once the pool is connected or a
    /// `NormalizerError` if the connection fails.
    pub async fn new(config: &MigrationConfig) -> Result<Self, NormalizerError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options())
            .await?;

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );

        let repository = PostgresMigrationRepository::new(pool.clone()).await?;
        let orchestrator = Orchestrator::new(Arc::new(repository), company_catalog(config.owner()));

        Ok(Self { pool, orchestrator })
    }
}
