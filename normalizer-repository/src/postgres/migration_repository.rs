//! PostgreSQL implementation of the migration repository.
//!
//! Every session wraps one `sqlx::Transaction`. DDL is transactional in
//! PostgreSQL, so schema changes and data writes made in a session commit or
//! roll back together.
use async_trait::async_trait;
use normalizer_shared::types::{
    ChildTable, DimensionTable, FieldSet, FieldValue, JunctionTable, OwnerTable, ENTRY_ORDINAL_COLUMN,
};
use serde_json::Value as JsonValue;
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::debug;

use super::ddl::{self, quote_ident};
use crate::{MigrationRepository, MigrationSession, OwnerPayload, RepositoryError};

/// PostgreSQL-backed migration repository.
///
/// Holds the connection pool; each call to [`MigrationRepository::begin`]
/// checks out a connection and opens a transaction on it.
pub struct PostgresMigrationRepository {
    pool: sqlx::PgPool,
}

impl PostgresMigrationRepository {
    /// Creates a new PostgreSQL repository instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresMigrationRepository)` - Ready-to-use repository instance
    /// * `Err(RepositoryError)` - Future validation errors (currently always succeeds)
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, RepositoryError> {
        Ok(Self { pool })
    }
}

#[async_trait]
impl MigrationRepository for PostgresMigrationRepository {
    async fn begin(&self) -> Result<Box<dyn MigrationSession>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresMigrationSession { tx }))
    }
}

/// A single PostgreSQL transaction. Dropping it without committing rolls back.
pub struct PostgresMigrationSession {
    tx: sqlx::Transaction<'static, Postgres>,
}

impl PostgresMigrationSession {
    async fn execute(&mut self, sql: &str) -> Result<u64, RepositoryError> {
        debug!(sql, "Executing statement");
        let result = sqlx::query(sql).execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }
}

/// Binds a field value with the Rust type matching its column.
fn push_field_bind(builder: &mut QueryBuilder<'_, Postgres>, value: &FieldValue) {
    match value {
        FieldValue::Text(text) => builder.push_bind(text.clone()),
        FieldValue::Flag(flag) => builder.push_bind(*flag),
        FieldValue::Integer(number) => builder.push_bind(*number),
        FieldValue::Date(date) => builder.push_bind(*date),
        FieldValue::Null => builder.push_bind(None::<String>),
    };
}

/// Resolves the dimension key columns against the extracted fields, in table order.
fn dimension_key<'a>(
    dimension: &DimensionTable,
    key: &'a FieldSet,
) -> Result<Vec<(&'static str, &'a FieldValue)>, RepositoryError> {
    dimension
        .key_columns()
        .map(|column| {
            key.get(column)
                .map(|value| (column, value))
                .ok_or_else(|| RepositoryError::MissingColumn {
                    table: dimension.name.to_string(),
                    column: column.to_string(),
                })
        })
        .collect()
}

#[async_trait]
impl MigrationSession for PostgresMigrationSession {
    async fn table_exists(&mut self, table: &str) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(exists)
    }

    async fn column_exists(&mut self, table: &str, column: &str) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.columns
                WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2
            )
            "#,
        )
        .bind(table)
        .bind(column)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(exists)
    }

    async fn rename_table(&mut self, from: &str, to: &str) -> Result<(), RepositoryError> {
        self.execute(&ddl::rename_table_sql(from, to)).await?;
        Ok(())
    }

    async fn add_identity_column(&mut self, owner: &OwnerTable) -> Result<(), RepositoryError> {
        self.execute(&ddl::add_identity_column_sql(owner)).await?;
        Ok(())
    }

    async fn create_dimension_table(&mut self, dimension: &DimensionTable) -> Result<(), RepositoryError> {
        self.execute(&ddl::create_dimension_table_sql(dimension)).await?;
        Ok(())
    }

    async fn create_junction_table(
        &mut self,
        owner: &OwnerTable,
        junction: &JunctionTable,
        dimension: &DimensionTable,
    ) -> Result<(), RepositoryError> {
        self.execute(&ddl::create_junction_table_sql(owner, junction, dimension))
            .await?;
        Ok(())
    }

    async fn create_child_table(&mut self, owner: &OwnerTable, child: &ChildTable) -> Result<(), RepositoryError> {
        self.execute(&ddl::create_child_table_sql(owner, child)).await?;
        Ok(())
    }

    async fn fetch_payloads(
        &mut self,
        owner: &OwnerTable,
        column: &str,
    ) -> Result<Vec<OwnerPayload>, RepositoryError> {
        // to_jsonb gives text columns and json columns the same shape on the way out.
        let sql = format!(
            "SELECT {id} AS owner_id, to_jsonb({column}) AS payload FROM {table} ORDER BY {id}",
            id = quote_ident(&owner.id_column),
            column = quote_ident(column),
            table = quote_ident(&owner.name),
        );

        let rows = sqlx::query(&sql).fetch_all(&mut *self.tx).await?;

        rows.iter()
            .map(|row| -> Result<OwnerPayload, RepositoryError> {
                Ok(OwnerPayload {
                    owner_id: row.try_get::<i64, _>("owner_id")?,
                    payload: row.try_get::<Option<JsonValue>, _>("payload")?,
                })
            })
            .collect()
    }

    async fn insert_dimension(
        &mut self,
        dimension: &DimensionTable,
        key: &FieldSet,
    ) -> Result<Option<i64>, RepositoryError> {
        let key = dimension_key(dimension, key)?;

        let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO ");
        builder.push(quote_ident(dimension.name));
        builder.push(" (");
        builder.push(
            key.iter()
                .map(|(column, _)| quote_ident(column))
                .collect::<Vec<_>>()
                .join(", "),
        );
        builder.push(") VALUES (");
        for (index, (_, value)) in key.iter().enumerate() {
            if index > 0 {
                builder.push(", ");
            }
            push_field_bind(&mut builder, value);
        }
        builder.push(") ON CONFLICT DO NOTHING RETURNING ");
        builder.push(quote_ident(dimension.id_column));

        let row = builder.build().fetch_optional(&mut *self.tx).await?;
        Ok(row.map(|row| row.try_get::<i64, _>(0)).transpose()?)
    }

    async fn find_dimension(
        &mut self,
        dimension: &DimensionTable,
        key: &FieldSet,
    ) -> Result<Option<i64>, RepositoryError> {
        let key = dimension_key(dimension, key)?;

        let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
        builder.push(quote_ident(dimension.id_column));
        builder.push(" FROM ");
        builder.push(quote_ident(dimension.name));
        for (index, (column, value)) in key.iter().enumerate() {
            builder.push(if index == 0 { " WHERE " } else { " AND " });
            builder.push(quote_ident(column));
            builder.push(" = ");
            push_field_bind(&mut builder, value);
        }

        let row = builder.build().fetch_optional(&mut *self.tx).await?;
        Ok(row.map(|row| row.try_get::<i64, _>(0)).transpose()?)
    }

    async fn insert_link(
        &mut self,
        owner: &OwnerTable,
        junction: &JunctionTable,
        owner_id: i64,
        dimension_id: i64,
    ) -> Result<bool, RepositoryError> {
        let sql = format!(
            "INSERT INTO {} ({}, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            quote_ident(junction.name),
            quote_ident(&owner.id_column),
            quote_ident(junction.dimension_column),
        );

        let result = sqlx::query(&sql)
            .bind(owner_id)
            .bind(dimension_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_child(
        &mut self,
        owner: &OwnerTable,
        child: &ChildTable,
        owner_id: i64,
        ordinal: i32,
        fields: &FieldSet,
    ) -> Result<bool, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO ");
        builder.push(quote_ident(child.name));
        builder.push(" (");
        builder.push(quote_ident(&owner.id_column));
        builder.push(", ");
        builder.push(quote_ident(ENTRY_ORDINAL_COLUMN));
        for (column, _) in fields.iter() {
            builder.push(", ");
            builder.push(quote_ident(column));
        }
        builder.push(") VALUES (");
        builder.push_bind(owner_id);
        builder.push(", ");
        builder.push_bind(ordinal);
        for (_, value) in fields.iter() {
            builder.push(", ");
            push_field_bind(&mut builder, value);
        }
        builder.push(") ON CONFLICT DO NOTHING");

        let result = builder.build().execute(&mut *self.tx).await?;
        Ok(result.rows_affected() == 1)
    }

    async fn drop_columns(&mut self, table: &str, columns: &[&str]) -> Result<(), RepositoryError> {
        if columns.is_empty() {
            return Ok(());
        }

        self.execute(&ddl::drop_columns_sql(table, columns)).await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
