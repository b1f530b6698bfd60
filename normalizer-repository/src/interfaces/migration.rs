//! This module defines the `MigrationRepository` and `MigrationSession` traits,
//! which provide the interface between the normalization pipeline and the
//! relational store. Every operation runs inside a session, and a session is a
//! single transaction.
use crate::errors::RepositoryError;
use normalizer_shared::types::{ChildTable, DimensionTable, FieldSet, JunctionTable, OwnerTable};
use serde_json::Value as JsonValue;

/// One owning record's identifier together with the raw value of a source column.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnerPayload {
    pub owner_id: i64,
    /// `None` when the column is SQL NULL.
    pub payload: Option<JsonValue>,
}

/// Entry point to the store: hands out transactional sessions.
#[async_trait::async_trait]
pub trait MigrationRepository: Send + Sync {
    /// Opens a new session backed by its own transaction.
    ///
    /// Nothing written through the session is visible to later sessions until
    /// [`MigrationSession::commit`] succeeds. Dropping a session without
    /// committing discards its writes.
    async fn begin(&self) -> Result<Box<dyn MigrationSession>, RepositoryError>;
}

/// A transaction against the store.
///
/// Implementors provide schema introspection, idempotent DDL and the small set
/// of DML statements the pipeline is built from.
#[async_trait::async_trait]
pub trait MigrationSession: Send {
    async fn table_exists(&mut self, table: &str) -> Result<bool, RepositoryError>;

    async fn column_exists(&mut self, table: &str, column: &str) -> Result<bool, RepositoryError>;

    async fn rename_table(&mut self, from: &str, to: &str) -> Result<(), RepositoryError>;

    /// Adds the auto-increment surrogate key to the owner table, numbering every
    /// existing row. Callers check [`column_exists`](Self::column_exists) first.
    async fn add_identity_column(&mut self, owner: &OwnerTable) -> Result<(), RepositoryError>;

    /// Creates the dimension table with a uniqueness constraint over its key
    /// columns. A no-op when the table already exists.
    async fn create_dimension_table(&mut self, dimension: &DimensionTable) -> Result<(), RepositoryError>;

    /// Creates the junction table with foreign keys to both sides and a
    /// uniqueness constraint on the pair. A no-op when the table already exists.
    async fn create_junction_table(
        &mut self,
        owner: &OwnerTable,
        junction: &JunctionTable,
        dimension: &DimensionTable,
    ) -> Result<(), RepositoryError>;

    /// Creates the child table with a foreign key to the owner and a
    /// uniqueness constraint on (owner, entry ordinal). A no-op when the table
    /// already exists.
    async fn create_child_table(&mut self, owner: &OwnerTable, child: &ChildTable) -> Result<(), RepositoryError>;

    /// Reads `column` for every owner row, ordered by owner identifier.
    async fn fetch_payloads(
        &mut self,
        owner: &OwnerTable,
        column: &str,
    ) -> Result<Vec<OwnerPayload>, RepositoryError>;

    /// Inserts the key unless an equal one exists.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(id))` - A new row was created
    /// * `Ok(None)` - The key already exists; nothing was written
    async fn insert_dimension(
        &mut self,
        dimension: &DimensionTable,
        key: &FieldSet,
    ) -> Result<Option<i64>, RepositoryError>;

    /// Looks up the identifier of an existing dimension row by its full key.
    async fn find_dimension(
        &mut self,
        dimension: &DimensionTable,
        key: &FieldSet,
    ) -> Result<Option<i64>, RepositoryError>;

    /// Inserts the (owner, dimension) pair unless it exists. Returns whether a
    /// row was written.
    async fn insert_link(
        &mut self,
        owner: &OwnerTable,
        junction: &JunctionTable,
        owner_id: i64,
        dimension_id: i64,
    ) -> Result<bool, RepositoryError>;

    /// Inserts one child row unless a row for the same (owner, ordinal) exists.
    /// Returns whether a row was written.
    async fn insert_child(
        &mut self,
        owner: &OwnerTable,
        child: &ChildTable,
        owner_id: i64,
        ordinal: i32,
        fields: &FieldSet,
    ) -> Result<bool, RepositoryError>;

    /// Drops the given columns from `table`. Columns that do not exist are ignored.
    async fn drop_columns(&mut self, table: &str, columns: &[&str]) -> Result<(), RepositoryError>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}
