//! This module defines the `DimensionResolver`, which maps an extracted key to
//! the identifier of its dimension row, creating the row on first encounter.
use normalizer_repository::{MigrationSession, RepositoryError};
use normalizer_shared::types::{DimensionTable, FieldSet};

/// The identifier a key resolved to, and whether this call created the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub id: i64,
    pub created: bool,
}

/// Insert-if-absent-else-fetch against one dimension table.
///
/// Nothing is cached between calls: every resolution reads the session, so
/// rows created earlier in the same transaction are always seen.
pub struct DimensionResolver {
    dimension: DimensionTable,
}

impl DimensionResolver {
    pub fn new(dimension: DimensionTable) -> Self {
        Self { dimension }
    }

    /// Resolves `key` to a dimension identifier.
    ///
    /// # Arguments
    ///
    /// * `session` - The open session of the current phase
    /// * `key` - Extracted field-set holding every key column of the dimension
    ///
    /// # Returns
    ///
    /// * `Ok(Resolution)` - The existing or newly created identifier
    /// * `Err(RepositoryError)` - The store failed, or the conflicting row
    ///   could not be read back
    pub async fn resolve(
        &self,
        session: &mut dyn MigrationSession,
        key: &FieldSet,
    ) -> Result<Resolution, RepositoryError> {
        if let Some(id) = session.insert_dimension(&self.dimension, key).await? {
            return Ok(Resolution { id, created: true });
        }

        match session.find_dimension(&self.dimension, key).await? {
            Some(id) => Ok(Resolution { id, created: false }),
            None => Err(RepositoryError::DimensionVanished {
                table: self.dimension.name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use normalizer_repository::{InMemoryMigrationRepository, MigrationRepository};
    use normalizer_shared::catalog::SPECIALTY;
    use normalizer_shared::types::FieldValue;

    fn key(name: &str) -> FieldSet {
        [("specialty_name", FieldValue::Text(name.to_string()))]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn test_same_key_resolves_to_same_id() {
        let repository = InMemoryMigrationRepository::new();
        let mut session = repository.begin().await.unwrap();
        session.create_dimension_table(&SPECIALTY).await.unwrap();
        let resolver = DimensionResolver::new(SPECIALTY);

        let first = resolver.resolve(session.as_mut(), &key("AI")).await.unwrap();
        let again = resolver.resolve(session.as_mut(), &key("AI")).await.unwrap();
        let other = resolver.resolve(session.as_mut(), &key("ML")).await.unwrap();

        assert_eq!(first, Resolution { id: 1, created: true });
        assert_eq!(again, Resolution { id: 1, created: false });
        assert_eq!(other, Resolution { id: 2, created: true });
    }

    #[tokio::test]
    async fn test_missing_table_is_an_error() {
        let repository = InMemoryMigrationRepository::new();
        let mut session = repository.begin().await.unwrap();
        let resolver = DimensionResolver::new(SPECIALTY);

        let result = resolver.resolve(session.as_mut(), &key("AI")).await;
        assert!(matches!(result, Err(RepositoryError::MissingTable(_))));
    }
}
