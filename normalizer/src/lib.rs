//! Normalizer Library
//!
//! This library wires the normalization pipeline to PostgreSQL, including
//! configuration management, error handling, and dependency injection.

pub mod config;
pub mod errors;

pub use config::{Dependencies, MigrationConfig};
pub use errors::{ConfigError, NormalizerError};
