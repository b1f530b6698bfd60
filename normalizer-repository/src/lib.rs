//! # Normalizer Repository
//! This crate provides traits and implementations for reading the denormalized
//! owner table and writing the normalized tables derived from it. It includes
//! definitions for errors, interfaces, a PostgreSQL implementation, and an
//! in-memory implementation used by tests and dry runs.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::RepositoryError;
pub use interfaces::{MigrationRepository, MigrationSession, OwnerPayload};
pub use memory::InMemoryMigrationRepository;
pub use postgres::PostgresMigrationRepository;
