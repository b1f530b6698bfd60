//! This module defines the `JunctionLinker`, which records that an owner row
//! refers to a dimension row.
use normalizer_repository::{MigrationSession, RepositoryError};
use normalizer_shared::types::{JunctionTable, OwnerTable};

/// Writes (owner, dimension) pairs into one junction table.
pub struct JunctionLinker<'a> {
    owner: &'a OwnerTable,
    junction: JunctionTable,
}

impl<'a> JunctionLinker<'a> {
    pub fn new(owner: &'a OwnerTable, junction: JunctionTable) -> Self {
        Self { owner, junction }
    }

    /// Ensures exactly one link exists for the pair.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The link was created by this call
    /// * `Ok(false)` - The link already existed
    pub async fn link(
        &self,
        session: &mut dyn MigrationSession,
        owner_id: i64,
        dimension_id: i64,
    ) -> Result<bool, RepositoryError> {
        session
            .insert_link(self.owner, &self.junction, owner_id, dimension_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use normalizer_repository::{InMemoryMigrationRepository, MigrationRepository};
    use normalizer_shared::catalog::INDUSTRY;
    use serde_json::json;

    #[tokio::test]
    async fn test_link_is_idempotent() {
        let repository = InMemoryMigrationRepository::new();
        repository.insert_table("company", &["name"], vec![json!({ "name": "Acme" })]);
        let owner = OwnerTable::new("company", "company_id");
        let junction = JunctionTable {
            name: "industry_type",
            id_column: "unique_id",
            dimension_column: "industry_id",
        };

        let mut session = repository.begin().await.unwrap();
        session.add_identity_column(&owner).await.unwrap();
        session.create_dimension_table(&INDUSTRY).await.unwrap();
        session.create_junction_table(&owner, &junction, &INDUSTRY).await.unwrap();

        let linker = JunctionLinker::new(&owner, junction);
        assert!(linker.link(session.as_mut(), 1, 7).await.unwrap());
        assert!(!linker.link(session.as_mut(), 1, 7).await.unwrap());
        assert!(linker.link(session.as_mut(), 1, 8).await.unwrap());
        session.commit().await.unwrap();

        assert_eq!(repository.row_count("industry_type"), 2);
    }
}
