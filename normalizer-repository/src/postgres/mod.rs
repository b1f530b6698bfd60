//! PostgreSQL implementation of the migration repository.
//!
//! ## Key Features
//!
//! - Connection pooling with `sqlx::PgPool`
//! - One transaction per session, rolled back on drop
//! - Idempotent DDL with `CREATE TABLE IF NOT EXISTS` and `DROP COLUMN IF EXISTS`
//! - Insert-if-absent writes with `ON CONFLICT DO NOTHING`
pub mod ddl;
mod migration_repository;

pub use migration_repository::{PostgresMigrationRepository, PostgresMigrationSession};
