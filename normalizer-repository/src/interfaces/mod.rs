//! This module defines and re-exports the interfaces for the migration repository.
//! It serves as a central point for accessing traits related to store interaction.
mod migration;

pub use migration::{MigrationRepository, MigrationSession, OwnerPayload};
