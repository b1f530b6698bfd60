//! SQL text for the schema statements issued by the PostgreSQL repository.
//!
//! Identifiers come from the catalog and configuration, never from row data,
//! but they are still quoted so reserved words such as `type` work as table names.
use normalizer_shared::types::{
    ChildTable, ColumnDef, ColumnType, DimensionTable, JunctionTable, OwnerTable, ENTRY_ORDINAL_COLUMN,
};

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_type_sql(ty: ColumnType) -> String {
    match ty {
        ColumnType::Varchar(len) => format!("VARCHAR({len})"),
        ColumnType::Text => "TEXT".to_string(),
        ColumnType::Boolean => "BOOLEAN".to_string(),
        ColumnType::BigInt => "BIGINT".to_string(),
        ColumnType::Date => "DATE".to_string(),
    }
}

fn column_sql(column: &ColumnDef) -> String {
    let null = if column.nullable { "" } else { " NOT NULL" };
    format!("{} {}{}", quote_ident(column.name), column_type_sql(column.ty), null)
}

fn ident_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names
        .into_iter()
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn rename_table_sql(from: &str, to: &str) -> String {
    format!("ALTER TABLE {} RENAME TO {}", quote_ident(from), quote_ident(to))
}

pub fn add_identity_column_sql(owner: &OwnerTable) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN {} BIGSERIAL PRIMARY KEY",
        quote_ident(&owner.name),
        quote_ident(&owner.id_column)
    )
}

pub fn create_dimension_table_sql(dimension: &DimensionTable) -> String {
    let columns: Vec<String> = dimension.columns.iter().map(column_sql).collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({} BIGSERIAL PRIMARY KEY, {}, UNIQUE ({}))",
        quote_ident(dimension.name),
        quote_ident(dimension.id_column),
        columns.join(", "),
        ident_list(dimension.key_columns())
    )
}

pub fn create_junction_table_sql(
    owner: &OwnerTable,
    junction: &JunctionTable,
    dimension: &DimensionTable,
) -> String {
    let owner_column = quote_ident(&owner.id_column);
    let dimension_column = quote_ident(junction.dimension_column);
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\
         {id} BIGSERIAL PRIMARY KEY, \
         {owner_column} BIGINT NOT NULL REFERENCES {owner_table} ({owner_column}), \
         {dimension_column} BIGINT NOT NULL REFERENCES {dimension_table} ({dimension_id}), \
         UNIQUE ({owner_column}, {dimension_column}))",
        table = quote_ident(junction.name),
        id = quote_ident(junction.id_column),
        owner_table = quote_ident(&owner.name),
        dimension_table = quote_ident(dimension.name),
        dimension_id = quote_ident(dimension.id_column),
    )
}

pub fn create_child_table_sql(owner: &OwnerTable, child: &ChildTable) -> String {
    let owner_column = quote_ident(&owner.id_column);
    let ordinal = quote_ident(ENTRY_ORDINAL_COLUMN);
    let columns: Vec<String> = child.columns.iter().map(column_sql).collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\
         {id} BIGSERIAL PRIMARY KEY, \
         {owner_column} BIGINT NOT NULL REFERENCES {owner_table} ({owner_column}), \
         {ordinal} INTEGER NOT NULL, \
         {columns}, \
         UNIQUE ({owner_column}, {ordinal}))",
        table = quote_ident(child.name),
        id = quote_ident(child.id_column),
        owner_table = quote_ident(&owner.name),
        columns = columns.join(", "),
    )
}

pub fn drop_columns_sql(table: &str, columns: &[&str]) -> String {
    let drops: Vec<String> = columns
        .iter()
        .map(|column| format!("DROP COLUMN IF EXISTS {}", quote_ident(column)))
        .collect();
    format!("ALTER TABLE {} {}", quote_ident(table), drops.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use normalizer_shared::catalog::{LOCATIONS, SIMILAR_COMPANY, SPECIALTY};

    fn owner() -> OwnerTable {
        OwnerTable::new("company", "company_id")
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("type"), "\"type\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_dimension_table_is_unique_over_key() {
        let sql = create_dimension_table_sql(&SPECIALTY);
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"specialty\" (\"specialty_name_id\" BIGSERIAL PRIMARY KEY, \
             \"specialty_name\" VARCHAR(255) NOT NULL, UNIQUE (\"specialty_name\"))"
        );
    }

    #[test]
    fn test_multi_column_dimension_key() {
        let sql = create_dimension_table_sql(&SIMILAR_COMPANY);
        assert!(sql.ends_with("UNIQUE (\"name\", \"linkedin_url\", \"industry\", \"location\"))"));
    }

    #[test]
    fn test_junction_references_both_sides() {
        let junction = JunctionTable {
            name: "company_specialty",
            id_column: "unique_id",
            dimension_column: "specialty_name_id",
        };
        let sql = create_junction_table_sql(&owner(), &junction, &SPECIALTY);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"company_specialty\""));
        assert!(sql.contains("\"company_id\" BIGINT NOT NULL REFERENCES \"company\" (\"company_id\")"));
        assert!(sql.contains(
            "\"specialty_name_id\" BIGINT NOT NULL REFERENCES \"specialty\" (\"specialty_name_id\")"
        ));
        assert!(sql.ends_with("UNIQUE (\"company_id\", \"specialty_name_id\"))"));
    }

    #[test]
    fn test_child_table_keyed_by_owner_and_ordinal() {
        let sql = create_child_table_sql(&owner(), &LOCATIONS);
        assert!(sql.contains("\"entry_ordinal\" INTEGER NOT NULL"));
        assert!(sql.contains("\"country\" VARCHAR(255),"));
        assert!(sql.contains("\"is_hq\" BOOLEAN NOT NULL"));
        assert!(sql.ends_with("UNIQUE (\"company_id\", \"entry_ordinal\"))"));
    }

    #[test]
    fn test_drop_columns_is_tolerant() {
        assert_eq!(
            drop_columns_sql("company", &["industry", "hq"]),
            "ALTER TABLE \"company\" DROP COLUMN IF EXISTS \"industry\", DROP COLUMN IF EXISTS \"hq\""
        );
    }

    #[test]
    fn test_identity_and_rename() {
        assert_eq!(
            add_identity_column_sql(&owner()),
            "ALTER TABLE \"company\" ADD COLUMN \"company_id\" BIGSERIAL PRIMARY KEY"
        );
        assert_eq!(
            rename_table_sql("company_raw", "company"),
            "ALTER TABLE \"company_raw\" RENAME TO \"company\""
        );
    }
}
