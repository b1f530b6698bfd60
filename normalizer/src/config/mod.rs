//! Configuration module for the normalizer.
//! Reads connection and table settings from the environment and wires the
//! pipeline to its store.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::MigrationConfig;
