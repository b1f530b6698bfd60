//! This module defines the `SchemaBuilder`, which prepares the owner table and
//! creates every destination table named by the catalog.
//!
//! All statements are idempotent: a table that already exists is left
//! untouched, so running the builder against a migrated schema changes nothing.
use normalizer_repository::MigrationSession;
use normalizer_shared::types::{Destination, MigrationCatalog};
use tracing::debug;

use crate::errors::SchemaError;

/// What a schema run changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaOutcome {
    /// The staging table was renamed to the owner table.
    pub renamed_staging: bool,
    /// The surrogate identifier was added to the owner table.
    pub identity_added: bool,
    pub tables_created: Vec<&'static str>,
}

pub struct SchemaBuilder<'a> {
    catalog: &'a MigrationCatalog,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(catalog: &'a MigrationCatalog) -> Self {
        Self { catalog }
    }

    /// Builds the target schema inside `session`.
    ///
    /// # Returns
    ///
    /// * `Ok(SchemaOutcome)` - The schema is in place
    /// * `Err(SchemaError)` - The owner table is missing, lacks its identifier,
    ///   or a statement failed
    pub async fn build(&self, session: &mut dyn MigrationSession) -> Result<SchemaOutcome, SchemaError> {
        let owner = &self.catalog.owner;
        let mut outcome = SchemaOutcome::default();

        if !session.table_exists(&owner.name).await? {
            let staging = match owner.staging_name.as_deref() {
                Some(staging) if session.table_exists(staging).await? => staging,
                _ => {
                    return Err(SchemaError::MissingOwnerTable {
                        table: owner.name.clone(),
                    });
                }
            };
            debug!(from = %staging, to = %owner.name, "Renaming staging table");
            session.rename_table(staging, &owner.name).await?;
            outcome.renamed_staging = true;
        }

        if !session.column_exists(&owner.name, &owner.id_column).await? {
            debug!(table = %owner.name, column = %owner.id_column, "Adding identifier column");
            session.add_identity_column(owner).await?;
            outcome.identity_added = true;

            if !session.column_exists(&owner.name, &owner.id_column).await? {
                return Err(SchemaError::MissingIdentifier {
                    table: owner.name.clone(),
                    column: owner.id_column.clone(),
                });
            }
        }

        for category in &self.catalog.categories {
            match category.destination {
                Destination::Dimension { dimension, junction } => {
                    if !session.table_exists(dimension.name).await? {
                        session.create_dimension_table(&dimension).await?;
                        outcome.tables_created.push(dimension.name);
                    }
                    if !session.table_exists(junction.name).await? {
                        session.create_junction_table(owner, &junction, &dimension).await?;
                        outcome.tables_created.push(junction.name);
                    }
                }
                Destination::Child(child) => {
                    if !session.table_exists(child.name).await? {
                        session.create_child_table(owner, &child).await?;
                        outcome.tables_created.push(child.name);
                    }
                }
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use normalizer_repository::{InMemoryMigrationRepository, MigrationRepository};
    use normalizer_shared::company_catalog;
    use normalizer_shared::types::OwnerTable;
    use serde_json::json;

    fn catalog() -> MigrationCatalog {
        company_catalog(OwnerTable::new("company", "company_id").with_staging("company_raw"))
    }

    #[tokio::test]
    async fn test_build_creates_every_table_once() {
        let repository = InMemoryMigrationRepository::new();
        repository.insert_table("company", &["name"], vec![json!({ "name": "Acme" })]);
        let catalog = catalog();
        let builder = SchemaBuilder::new(&catalog);

        let mut session = repository.begin().await.unwrap();
        let first = builder.build(session.as_mut()).await.unwrap();
        let second = builder.build(session.as_mut()).await.unwrap();
        session.commit().await.unwrap();

        assert!(!first.renamed_staging);
        assert!(first.identity_added);
        assert_eq!(first.tables_created.len(), 13);
        assert_eq!(second, SchemaOutcome::default());
        assert!(repository.has_table("company_specialty"));
        assert!(repository.has_table("locations"));
    }

    #[tokio::test]
    async fn test_build_renames_staging_table() {
        let repository = InMemoryMigrationRepository::new();
        repository.insert_table("company_raw", &["name"], vec![json!({ "name": "Acme" })]);
        let catalog = catalog();

        let mut session = repository.begin().await.unwrap();
        let outcome = SchemaBuilder::new(&catalog).build(session.as_mut()).await.unwrap();
        session.commit().await.unwrap();

        assert!(outcome.renamed_staging);
        assert!(repository.has_table("company"));
        assert!(!repository.has_table("company_raw"));
    }

    #[tokio::test]
    async fn test_build_without_owner_fails() {
        let repository = InMemoryMigrationRepository::new();
        let catalog = catalog();

        let mut session = repository.begin().await.unwrap();
        let result = SchemaBuilder::new(&catalog).build(session.as_mut()).await;

        assert!(matches!(result, Err(SchemaError::MissingOwnerTable { .. })));
    }
}
