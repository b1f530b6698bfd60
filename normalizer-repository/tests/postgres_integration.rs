//! Integration tests for the PostgreSQL migration repository.
//!
//! These tests require a real PostgreSQL database and use SQLx test macros
//! to give every test its own throwaway database.
//!
//! Run with: `DATABASE_URL=postgres://... cargo test --test postgres_integration`

use normalizer_repository::{MigrationRepository, PostgresMigrationRepository, RepositoryError};
use normalizer_shared::catalog::{COMPANY_UPDATES, SIMILAR_COMPANY, SPECIALTY};
use normalizer_shared::types::{FieldSet, FieldValue, JunctionTable, OwnerTable};
use sqlx::Row;

fn owner() -> OwnerTable {
    OwnerTable::new("company", "company_id")
}

fn specialty_junction() -> JunctionTable {
    JunctionTable {
        name: "company_specialty",
        id_column: "unique_id",
        dimension_column: "specialty_name_id",
    }
}

fn text(column: &'static str, value: &str) -> (&'static str, FieldValue) {
    (column, FieldValue::Text(value.to_string()))
}

/// Creates a small denormalized company table with a JSON and a text column.
async fn seed_company(pool: &sqlx::PgPool) {
    sqlx::query("CREATE TABLE company (name TEXT, specialities JSONB, industry TEXT, hq TEXT)")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(
        r#"
        INSERT INTO company (name, specialities, industry) VALUES
            ('Acme', '["AI", "Robotics"]', 'Software'),
            ('Globex', NULL, 'Energy')
        "#,
    )
    .execute(pool)
    .await
    .unwrap();
}

// ============================================================================
// Schema Tests
// ============================================================================

#[sqlx::test]
async fn test_identity_column_and_introspection(pool: sqlx::PgPool) {
    seed_company(&pool).await;
    let repository = PostgresMigrationRepository::new(pool.clone()).await.unwrap();

    let mut session = repository.begin().await.unwrap();
    assert!(session.table_exists("company").await.unwrap());
    assert!(!session.column_exists("company", "company_id").await.unwrap());
    session.add_identity_column(&owner()).await.unwrap();
    assert!(session.column_exists("company", "company_id").await.unwrap());
    session.commit().await.unwrap();

    let ids: Vec<i64> = sqlx::query_scalar("SELECT company_id FROM company ORDER BY company_id")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(ids, vec![1, 2]);
}

#[sqlx::test]
async fn test_rollback_discards_ddl(pool: sqlx::PgPool) {
    seed_company(&pool).await;
    let repository = PostgresMigrationRepository::new(pool.clone()).await.unwrap();

    let mut session = repository.begin().await.unwrap();
    session.create_dimension_table(&SPECIALTY).await.unwrap();
    session.rollback().await.unwrap();

    let mut session = repository.begin().await.unwrap();
    assert!(!session.table_exists("specialty").await.unwrap());
}

#[sqlx::test]
async fn test_drop_columns_ignores_missing(pool: sqlx::PgPool) {
    seed_company(&pool).await;
    let repository = PostgresMigrationRepository::new(pool.clone()).await.unwrap();

    let mut session = repository.begin().await.unwrap();
    session
        .drop_columns("company", &["hq", "funding_data"])
        .await
        .unwrap();
    assert!(!session.column_exists("company", "hq").await.unwrap());
    session.commit().await.unwrap();
}

// ============================================================================
// Data Tests
// ============================================================================

#[sqlx::test]
async fn test_fetch_payloads_reads_json_and_text(pool: sqlx::PgPool) {
    seed_company(&pool).await;
    let repository = PostgresMigrationRepository::new(pool.clone()).await.unwrap();

    let mut session = repository.begin().await.unwrap();
    session.add_identity_column(&owner()).await.unwrap();

    let specialities = session.fetch_payloads(&owner(), "specialities").await.unwrap();
    assert_eq!(specialities.len(), 2);
    assert_eq!(specialities[0].payload, Some(serde_json::json!(["AI", "Robotics"])));
    assert_eq!(specialities[1].payload, None);

    let industries = session.fetch_payloads(&owner(), "industry").await.unwrap();
    assert_eq!(industries[1].payload, Some(serde_json::json!("Energy")));
}

#[sqlx::test]
async fn test_dimension_insert_then_find(pool: sqlx::PgPool) {
    seed_company(&pool).await;
    let repository = PostgresMigrationRepository::new(pool.clone()).await.unwrap();

    let mut session = repository.begin().await.unwrap();
    session.create_dimension_table(&SPECIALTY).await.unwrap();

    let key: FieldSet = [text("specialty_name", "AI")].into_iter().collect();
    let created = session.insert_dimension(&SPECIALTY, &key).await.unwrap();
    let conflicting = session.insert_dimension(&SPECIALTY, &key).await.unwrap();
    let found = session.find_dimension(&SPECIALTY, &key).await.unwrap();

    assert!(created.is_some());
    assert_eq!(conflicting, None);
    assert_eq!(found, created);
}

#[sqlx::test]
async fn test_dimension_key_must_be_complete(pool: sqlx::PgPool) {
    seed_company(&pool).await;
    let repository = PostgresMigrationRepository::new(pool.clone()).await.unwrap();

    let mut session = repository.begin().await.unwrap();
    session.create_dimension_table(&SIMILAR_COMPANY).await.unwrap();

    let partial: FieldSet = [text("name", "Initech")].into_iter().collect();
    let result = session.insert_dimension(&SIMILAR_COMPANY, &partial).await;

    assert!(matches!(result, Err(RepositoryError::MissingColumn { .. })));
}

#[sqlx::test]
async fn test_links_are_unique_per_pair(pool: sqlx::PgPool) {
    seed_company(&pool).await;
    let repository = PostgresMigrationRepository::new(pool.clone()).await.unwrap();

    let mut session = repository.begin().await.unwrap();
    session.add_identity_column(&owner()).await.unwrap();
    session.create_dimension_table(&SPECIALTY).await.unwrap();
    session
        .create_junction_table(&owner(), &specialty_junction(), &SPECIALTY)
        .await
        .unwrap();

    let key: FieldSet = [text("specialty_name", "AI")].into_iter().collect();
    let dimension_id = session.insert_dimension(&SPECIALTY, &key).await.unwrap().unwrap();

    assert!(session.insert_link(&owner(), &specialty_junction(), 1, dimension_id).await.unwrap());
    assert!(!session.insert_link(&owner(), &specialty_junction(), 1, dimension_id).await.unwrap());
    assert!(session.insert_link(&owner(), &specialty_junction(), 2, dimension_id).await.unwrap());
    session.commit().await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM company_specialty")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[sqlx::test]
async fn test_child_rows_keyed_by_ordinal(pool: sqlx::PgPool) {
    seed_company(&pool).await;
    let repository = PostgresMigrationRepository::new(pool.clone()).await.unwrap();

    let mut session = repository.begin().await.unwrap();
    session.add_identity_column(&owner()).await.unwrap();
    session.create_child_table(&owner(), &COMPANY_UPDATES).await.unwrap();

    let fields: FieldSet = [
        text("article_link", "No Link Provided"),
        text("image", ""),
        (
            "posted_on",
            FieldValue::Date(chrono::NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()),
        ),
        text("update_text", "Launched"),
        ("total_likes", FieldValue::Integer(12)),
    ]
    .into_iter()
    .collect();

    assert!(session.insert_child(&owner(), &COMPANY_UPDATES, 1, 0, &fields).await.unwrap());
    assert!(!session.insert_child(&owner(), &COMPANY_UPDATES, 1, 0, &fields).await.unwrap());
    session.commit().await.unwrap();

    let rows = sqlx::query("SELECT company_id, total_likes, posted_on FROM company_updates")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get::<i64, _>("total_likes"), 12);
    assert_eq!(
        rows[0].get::<chrono::NaiveDate, _>("posted_on"),
        chrono::NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()
    );
}
