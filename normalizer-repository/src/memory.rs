//! In-memory migration repository for testing and dry runs.
//!
//! Tables are plain row vectors keyed by name. A session works on a private
//! copy of the whole store and publishes it on commit, which gives the same
//! all-or-nothing behaviour as a database transaction for a single writer.
//!
//! # Example
//!
//! ```ignore
//! use normalizer_repository::InMemoryMigrationRepository;
//! use serde_json::json;
//!
//! let repository = InMemoryMigrationRepository::new();
//! repository.insert_table(
//!     "company",
//!     &["name", "industry"],
//!     vec![json!({ "name": "Acme", "industry": "Software" })],
//! );
//! repository.reject_writes_to("industry");
//! ```

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use normalizer_shared::types::{
    ChildTable, DimensionTable, FieldSet, FieldValue, JunctionTable, OwnerTable, ENTRY_ORDINAL_COLUMN,
};
use serde_json::Value as JsonValue;

use crate::{MigrationRepository, MigrationSession, OwnerPayload, RepositoryError};

/// A stored row: column name to JSON value.
pub type MemoryRow = BTreeMap<String, JsonValue>;

#[derive(Clone, Debug, Default)]
struct MemoryTable {
    columns: Vec<String>,
    id_column: Option<String>,
    next_id: i64,
    rows: Vec<MemoryRow>,
}

impl MemoryTable {
    fn with_columns(id_column: &str, columns: impl IntoIterator<Item = String>) -> Self {
        let mut all = vec![id_column.to_string()];
        all.extend(columns);
        Self {
            columns: all,
            id_column: Some(id_column.to_string()),
            next_id: 1,
            rows: Vec::new(),
        }
    }

    /// Appends a row, assigning the next identifier when the table has one.
    fn insert(&mut self, mut row: MemoryRow) -> Option<i64> {
        let id = self.id_column.clone().map(|column| {
            let id = self.next_id;
            self.next_id += 1;
            row.insert(column, JsonValue::from(id));
            id
        });
        self.rows.push(row);
        id
    }

    fn find(&self, key: &[(&str, JsonValue)]) -> Option<&MemoryRow> {
        self.rows.iter().find(|row| {
            key.iter()
                .all(|(column, value)| row.get(*column).unwrap_or(&JsonValue::Null) == value)
        })
    }

    fn row_id(&self, row: &MemoryRow) -> Option<i64> {
        self.id_column
            .as_ref()
            .and_then(|column| row.get(column))
            .and_then(JsonValue::as_i64)
    }
}

#[derive(Clone, Debug, Default)]
struct MemoryState {
    tables: BTreeMap<String, MemoryTable>,
}

/// Migration repository backed by process memory.
///
/// Cloning the repository shares the underlying store, so a test can keep a
/// handle for assertions while the orchestrator owns another.
#[derive(Clone, Default)]
pub struct InMemoryMigrationRepository {
    state: Arc<RwLock<MemoryState>>,
    rejected: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryMigrationRepository {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a table without an identifier column.
    ///
    /// Rows are JSON objects; members not listed in `columns` are ignored and
    /// listed columns missing from a row read as NULL.
    pub fn insert_table(&self, name: &str, columns: &[&str], rows: Vec<JsonValue>) {
        let rows = rows
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| (column.to_string(), row.get(*column).cloned().unwrap_or(JsonValue::Null)))
                    .collect()
            })
            .collect();

        let table = MemoryTable {
            columns: columns.iter().map(|column| column.to_string()).collect(),
            id_column: None,
            next_id: 1,
            rows,
        };

        if let Ok(mut state) = self.state.write() {
            state.tables.insert(name.to_string(), table);
        }
    }

    /// Make every row write and column drop on `table` fail until
    /// [`accept_all_writes`](Self::accept_all_writes). Sessions pick the
    /// setting up when they begin.
    pub fn reject_writes_to(&self, table: &str) {
        if let Ok(mut rejected) = self.rejected.write() {
            rejected.insert(table.to_string());
        }
    }

    pub fn accept_all_writes(&self) {
        if let Ok(mut rejected) = self.rejected.write() {
            rejected.clear();
        }
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.state
            .read()
            .map(|state| state.tables.contains_key(table))
            .unwrap_or(false)
    }

    /// Committed columns of `table`, in creation order.
    pub fn columns(&self, table: &str) -> Vec<String> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.tables.get(table).map(|t| t.columns.clone()))
            .unwrap_or_default()
    }

    /// Committed rows of `table`.
    pub fn rows(&self, table: &str) -> Vec<MemoryRow> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.tables.get(table).map(|t| t.rows.clone()))
            .unwrap_or_default()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.rows(table).len()
    }

    /// Every committed table with its rows, for whole-store comparisons.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<MemoryRow>> {
        self.state
            .read()
            .map(|state| {
                state
                    .tables
                    .iter()
                    .map(|(name, table)| (name.clone(), table.rows.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl MigrationRepository for InMemoryMigrationRepository {
    async fn begin(&self) -> Result<Box<dyn MigrationSession>, RepositoryError> {
        let working = self
            .state
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?
            .clone();
        let rejected = self
            .rejected
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?
            .clone();

        Ok(Box::new(InMemorySession {
            working,
            shared: Arc::clone(&self.state),
            rejected,
        }))
    }
}

/// A private working copy of the store.
pub struct InMemorySession {
    working: MemoryState,
    shared: Arc<RwLock<MemoryState>>,
    rejected: HashSet<String>,
}

fn to_json(value: &FieldValue) -> Result<JsonValue, RepositoryError> {
    Ok(serde_json::to_value(value)?)
}

impl InMemorySession {
    fn table(&self, name: &str) -> Result<&MemoryTable, RepositoryError> {
        self.working
            .tables
            .get(name)
            .ok_or_else(|| RepositoryError::MissingTable(name.to_string()))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut MemoryTable, RepositoryError> {
        self.working
            .tables
            .get_mut(name)
            .ok_or_else(|| RepositoryError::MissingTable(name.to_string()))
    }

    /// Mutable access for a row write or column drop, honouring injected
    /// rejections. Schema statements bypass rejections.
    fn writable(&mut self, name: &str) -> Result<&mut MemoryTable, RepositoryError> {
        if self.rejected.contains(name) {
            return Err(RepositoryError::WriteRejected {
                table: name.to_string(),
                reason: "writes rejected by test configuration".to_string(),
            });
        }
        self.table_mut(name)
    }

    fn dimension_key(
        dimension: &DimensionTable,
        key: &FieldSet,
    ) -> Result<Vec<(&'static str, JsonValue)>, RepositoryError> {
        dimension
            .key_columns()
            .map(|column| -> Result<(&'static str, JsonValue), RepositoryError> {
                let value = key.get(column).ok_or_else(|| RepositoryError::MissingColumn {
                    table: dimension.name.to_string(),
                    column: column.to_string(),
                })?;
                Ok((column, to_json(value)?))
            })
            .collect()
    }

    fn create_table(&mut self, name: &str, table: MemoryTable) -> Result<(), RepositoryError> {
        self.working.tables.entry(name.to_string()).or_insert(table);
        Ok(())
    }
}

#[async_trait]
impl MigrationSession for InMemorySession {
    async fn table_exists(&mut self, table: &str) -> Result<bool, RepositoryError> {
        Ok(self.working.tables.contains_key(table))
    }

    async fn column_exists(&mut self, table: &str, column: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .working
            .tables
            .get(table)
            .is_some_and(|t| t.columns.iter().any(|c| c == column)))
    }

    async fn rename_table(&mut self, from: &str, to: &str) -> Result<(), RepositoryError> {
        if self.working.tables.contains_key(to) {
            return Err(RepositoryError::WriteRejected {
                table: to.to_string(),
                reason: "relation already exists".to_string(),
            });
        }
        let table = self
            .working
            .tables
            .remove(from)
            .ok_or_else(|| RepositoryError::MissingTable(from.to_string()))?;
        self.working.tables.insert(to.to_string(), table);
        Ok(())
    }

    async fn add_identity_column(&mut self, owner: &OwnerTable) -> Result<(), RepositoryError> {
        let id_column = owner.id_column.clone();
        let table = self.table_mut(&owner.name)?;
        if table.columns.contains(&id_column) {
            return Err(RepositoryError::WriteRejected {
                table: owner.name.clone(),
                reason: format!("column {id_column} already exists"),
            });
        }

        for (index, row) in table.rows.iter_mut().enumerate() {
            row.insert(id_column.clone(), JsonValue::from(index as i64 + 1));
        }
        table.next_id = table.rows.len() as i64 + 1;
        table.columns.insert(0, id_column.clone());
        table.id_column = Some(id_column);
        Ok(())
    }

    async fn create_dimension_table(&mut self, dimension: &DimensionTable) -> Result<(), RepositoryError> {
        let table = MemoryTable::with_columns(
            dimension.id_column,
            dimension.key_columns().map(str::to_string),
        );
        self.create_table(dimension.name, table)
    }

    async fn create_junction_table(
        &mut self,
        owner: &OwnerTable,
        junction: &JunctionTable,
        dimension: &DimensionTable,
    ) -> Result<(), RepositoryError> {
        self.table(&owner.name)?;
        self.table(dimension.name)?;
        let table = MemoryTable::with_columns(
            junction.id_column,
            [owner.id_column.clone(), junction.dimension_column.to_string()],
        );
        self.create_table(junction.name, table)
    }

    async fn create_child_table(&mut self, owner: &OwnerTable, child: &ChildTable) -> Result<(), RepositoryError> {
        self.table(&owner.name)?;
        let columns = [owner.id_column.clone(), ENTRY_ORDINAL_COLUMN.to_string()]
            .into_iter()
            .chain(child.columns.iter().map(|column| column.name.to_string()));
        let table = MemoryTable::with_columns(child.id_column, columns);
        self.create_table(child.name, table)
    }

    async fn fetch_payloads(
        &mut self,
        owner: &OwnerTable,
        column: &str,
    ) -> Result<Vec<OwnerPayload>, RepositoryError> {
        let table = self.table(&owner.name)?;
        for required in [owner.id_column.as_str(), column] {
            if !table.columns.iter().any(|c| c == required) {
                return Err(RepositoryError::MissingColumn {
                    table: owner.name.clone(),
                    column: required.to_string(),
                });
            }
        }

        let mut payloads = table
            .rows
            .iter()
            .map(|row| -> Result<OwnerPayload, RepositoryError> {
                let owner_id = table.row_id(row).ok_or_else(|| RepositoryError::MissingColumn {
                    table: owner.name.clone(),
                    column: owner.id_column.clone(),
                })?;
                let payload = row.get(column).filter(|value| !value.is_null()).cloned();
                Ok(OwnerPayload { owner_id, payload })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        payloads.sort_by_key(|payload| payload.owner_id);
        Ok(payloads)
    }

    async fn insert_dimension(
        &mut self,
        dimension: &DimensionTable,
        key: &FieldSet,
    ) -> Result<Option<i64>, RepositoryError> {
        let key = Self::dimension_key(dimension, key)?;
        let table = self.writable(dimension.name)?;
        if table.find(&key).is_some() {
            return Ok(None);
        }

        let row = key
            .into_iter()
            .map(|(column, value)| (column.to_string(), value))
            .collect();
        Ok(table.insert(row))
    }

    async fn find_dimension(
        &mut self,
        dimension: &DimensionTable,
        key: &FieldSet,
    ) -> Result<Option<i64>, RepositoryError> {
        let key = Self::dimension_key(dimension, key)?;
        let table = self.table(dimension.name)?;
        Ok(table.find(&key).and_then(|row| table.row_id(row)))
    }

    async fn insert_link(
        &mut self,
        owner: &OwnerTable,
        junction: &JunctionTable,
        owner_id: i64,
        dimension_id: i64,
    ) -> Result<bool, RepositoryError> {
        let key = [
            (owner.id_column.as_str(), JsonValue::from(owner_id)),
            (junction.dimension_column, JsonValue::from(dimension_id)),
        ];
        let table = self.writable(junction.name)?;
        if table.find(&key).is_some() {
            return Ok(false);
        }

        let row = key
            .into_iter()
            .map(|(column, value)| (column.to_string(), value))
            .collect();
        table.insert(row);
        Ok(true)
    }

    async fn insert_child(
        &mut self,
        owner: &OwnerTable,
        child: &ChildTable,
        owner_id: i64,
        ordinal: i32,
        fields: &FieldSet,
    ) -> Result<bool, RepositoryError> {
        let key = [
            (owner.id_column.as_str(), JsonValue::from(owner_id)),
            (ENTRY_ORDINAL_COLUMN, JsonValue::from(ordinal)),
        ];
        let table = self.writable(child.name)?;
        if table.find(&key).is_some() {
            return Ok(false);
        }

        let row = key
            .into_iter()
            .map(|(column, value)| (column.to_string(), value))
            .map(Ok)
            .chain(
                fields
                    .iter()
                    .map(|(column, value)| -> Result<(String, JsonValue), RepositoryError> {
                        Ok((column.to_string(), to_json(value)?))
                    }),
            )
            .collect::<Result<MemoryRow, RepositoryError>>()?;
        table.insert(row);
        Ok(true)
    }

    async fn drop_columns(&mut self, table: &str, columns: &[&str]) -> Result<(), RepositoryError> {
        if columns.is_empty() {
            return Ok(());
        }

        let target = self.writable(table)?;
        target.columns.retain(|column| !columns.contains(&column.as_str()));
        for row in target.rows.iter_mut() {
            row.retain(|column, _| !columns.contains(&column.as_str()));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let mut shared = self.shared.write().map_err(|_| RepositoryError::LockPoisoned)?;
        *shared = self.working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use normalizer_shared::catalog::{LOCATIONS, SPECIALTY};
    use serde_json::json;

    fn owner() -> OwnerTable {
        OwnerTable::new("company", "company_id")
    }

    fn seeded() -> InMemoryMigrationRepository {
        let repository = InMemoryMigrationRepository::new();
        repository.insert_table(
            "company",
            &["name", "specialities"],
            vec![
                json!({ "name": "Acme", "specialities": ["AI"] }),
                json!({ "name": "Globex", "specialities": null }),
            ],
        );
        repository
    }

    fn specialty_key(name: &str) -> FieldSet {
        [("specialty_name", FieldValue::Text(name.to_string()))]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn test_identity_column_numbers_rows() {
        let repository = seeded();
        let mut session = repository.begin().await.unwrap();
        session.add_identity_column(&owner()).await.unwrap();
        let payloads = session.fetch_payloads(&owner(), "specialities").await.unwrap();
        session.commit().await.unwrap();

        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].owner_id, 1);
        assert_eq!(payloads[0].payload, Some(json!(["AI"])));
        assert_eq!(payloads[1].owner_id, 2);
        assert_eq!(payloads[1].payload, None);
        assert_eq!(repository.columns("company")[0], "company_id");
    }

    #[tokio::test]
    async fn test_uncommitted_session_is_discarded() {
        let repository = seeded();
        let mut session = repository.begin().await.unwrap();
        session.create_dimension_table(&SPECIALTY).await.unwrap();
        session.rollback().await.unwrap();

        assert!(!repository.has_table("specialty"));
    }

    #[tokio::test]
    async fn test_dimension_insert_is_conflict_aware() {
        let repository = seeded();
        let mut session = repository.begin().await.unwrap();
        session.create_dimension_table(&SPECIALTY).await.unwrap();

        let first = session.insert_dimension(&SPECIALTY, &specialty_key("AI")).await.unwrap();
        let second = session.insert_dimension(&SPECIALTY, &specialty_key("AI")).await.unwrap();
        let found = session.find_dimension(&SPECIALTY, &specialty_key("AI")).await.unwrap();
        let missing = session.find_dimension(&SPECIALTY, &specialty_key("ML")).await.unwrap();

        assert_eq!(first, Some(1));
        assert_eq!(second, None);
        assert_eq!(found, Some(1));
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_child_insert_skips_existing_ordinal() {
        let repository = seeded();
        let mut session = repository.begin().await.unwrap();
        session.add_identity_column(&owner()).await.unwrap();
        session.create_child_table(&owner(), &LOCATIONS).await.unwrap();

        let fields: FieldSet = [("country", FieldValue::Text("US".to_string()))].into_iter().collect();
        assert!(session.insert_child(&owner(), &LOCATIONS, 1, 0, &fields).await.unwrap());
        assert!(!session.insert_child(&owner(), &LOCATIONS, 1, 0, &fields).await.unwrap());
        assert!(session.insert_child(&owner(), &LOCATIONS, 1, 1, &fields).await.unwrap());
        session.commit().await.unwrap();

        assert_eq!(repository.row_count("locations"), 2);
    }

    #[tokio::test]
    async fn test_rejected_writes_fail() {
        let repository = seeded();
        repository.reject_writes_to("company");
        let mut session = repository.begin().await.unwrap();
        let result = session.drop_columns("company", &["specialities"]).await;

        assert!(matches!(result, Err(RepositoryError::WriteRejected { .. })));
    }

    #[tokio::test]
    async fn test_drop_columns_ignores_unknown() {
        let repository = seeded();
        let mut session = repository.begin().await.unwrap();
        session
            .drop_columns("company", &["specialities", "does_not_exist"])
            .await
            .unwrap();
        session.commit().await.unwrap();

        assert_eq!(repository.columns("company"), vec!["name".to_string()]);
        assert!(repository.rows("company").iter().all(|row| !row.contains_key("specialities")));
    }
}
