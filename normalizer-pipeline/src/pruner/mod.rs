//! This module defines the `ColumnPruner`, which removes owner columns whose
//! content has been migrated or retired.
use normalizer_repository::{MigrationSession, RepositoryError};
use normalizer_shared::types::OwnerTable;

pub struct ColumnPruner<'a> {
    owner: &'a OwnerTable,
}

impl<'a> ColumnPruner<'a> {
    pub fn new(owner: &'a OwnerTable) -> Self {
        Self { owner }
    }

    /// Drops every listed column that still exists on the owner table.
    ///
    /// # Returns
    ///
    /// The columns actually dropped, in the order given. Already-missing
    /// columns are left out, so a second run returns an empty list.
    pub async fn prune(
        &self,
        session: &mut dyn MigrationSession,
        columns: &[&'static str],
    ) -> Result<Vec<&'static str>, RepositoryError> {
        let mut present = Vec::with_capacity(columns.len());
        for column in columns {
            if session.column_exists(&self.owner.name, column).await? {
                present.push(*column);
            }
        }

        session.drop_columns(&self.owner.name, &present).await?;
        Ok(present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use normalizer_repository::{InMemoryMigrationRepository, MigrationRepository};
    use serde_json::json;

    #[tokio::test]
    async fn test_prune_reports_only_existing_columns() {
        let repository = InMemoryMigrationRepository::new();
        repository.insert_table(
            "company",
            &["name", "industry", "hq"],
            vec![json!({ "name": "Acme", "industry": "Software", "hq": "{}" })],
        );
        let owner = OwnerTable::new("company", "company_id");
        let pruner = ColumnPruner::new(&owner);

        let mut session = repository.begin().await.unwrap();
        let dropped = pruner
            .prune(session.as_mut(), &["industry", "funding_data", "hq"])
            .await
            .unwrap();
        let again = pruner.prune(session.as_mut(), &["industry", "hq"]).await.unwrap();
        session.commit().await.unwrap();

        assert_eq!(dropped, vec!["industry", "hq"]);
        assert!(again.is_empty());
        assert_eq!(repository.columns("company"), vec!["name".to_string()]);
    }
}
