//! Normalizer Main Entry Point
//!
//! Migrates the denormalized company table into dimension, junction and child
//! tables, then drops the migrated columns.

use std::env;

use dotenv::dotenv;
use normalizer::{Dependencies, MigrationConfig, NormalizerError};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), NormalizerError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("normalizer=info,normalizer_pipeline=info"));

    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
            .map_err(|e| NormalizerError::Tracing(e.to_string()))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| NormalizerError::Tracing(e.to_string()))?;
    }

    info!(
        service_name = "normalizer",
        service_version = env!("CARGO_PKG_VERSION"),
        json,
        "Tracing initialized"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), NormalizerError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    let config = match MigrationConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(config = ?config, "Configuration loaded");

    let mut deps = match Dependencies::new(&config).await {
        Ok(deps) => deps,
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let result = deps.orchestrator.run().await;
    deps.pool.close().await;

    match result {
        Ok(report) => {
            for phase in &report.phases {
                info!(
                    phase = %phase.phase,
                    outcome = phase.status.as_str(),
                    extracted = phase.extracted,
                    discarded = phase.discarded,
                    skipped = phase.skipped,
                    dimensions_created = phase.dimensions_created,
                    links_created = phase.links_created,
                    children_created = phase.children_created,
                    "Phase summary"
                );
            }
            info!("Migration completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(
                phase = e.phase(),
                state = ?deps.orchestrator.state(),
                error = %e,
                "Migration stopped; committed phases remain and a re-run resumes"
            );
            Err(e.into())
        }
    }
}
