//! The category table for the company dataset.
//!
//! Each entry says which owner column to read, how to pull fields out of it,
//! and which tables receive the result. The orchestrator walks the list in
//! order, so categories that share nothing can be added or removed freely.
use crate::types::{
    CategorySpec, ChildTable, ColumnDef, ColumnType, DateDefaults, Destination, DimensionTable,
    FieldMap, FieldSpec, JunctionTable, MigrationCatalog, OwnerTable, PayloadShape,
};

// =============================================================================
// Dimensions
// =============================================================================

pub const SPECIALTY: DimensionTable = DimensionTable {
    name: "specialty",
    id_column: "specialty_name_id",
    columns: &[ColumnDef::required("specialty_name", ColumnType::Varchar(255))],
};

pub const COMPANY_TYPE: DimensionTable = DimensionTable {
    name: "type",
    id_column: "company_type_id",
    columns: &[ColumnDef::required("company_type_name", ColumnType::Varchar(255))],
};

pub const INDUSTRY: DimensionTable = DimensionTable {
    name: "industry",
    id_column: "industry_id",
    columns: &[ColumnDef::required("industry_name", ColumnType::Varchar(255))],
};

pub const SIZE_RANGE: DimensionTable = DimensionTable {
    name: "company_size_range",
    id_column: "size_range_id",
    columns: &[ColumnDef::required("size_range", ColumnType::Varchar(20))],
};

pub const SIMILAR_COMPANY: DimensionTable = DimensionTable {
    name: "similar_companies",
    id_column: "similar_companies_id",
    columns: &[
        ColumnDef::required("name", ColumnType::Varchar(500)),
        ColumnDef::required("linkedin_url", ColumnType::Varchar(500)),
        ColumnDef::required("industry", ColumnType::Varchar(500)),
        ColumnDef::required("location", ColumnType::Varchar(500)),
    ],
};

// =============================================================================
// Child tables
// =============================================================================

pub const LOCATIONS: ChildTable = ChildTable {
    name: "locations",
    id_column: "locations_id",
    columns: &[
        ColumnDef::optional("country", ColumnType::Varchar(255)),
        ColumnDef::optional("city", ColumnType::Varchar(255)),
        ColumnDef::optional("postal_code", ColumnType::Varchar(50)),
        ColumnDef::optional("address_line1", ColumnType::Varchar(500)),
        ColumnDef::required("is_hq", ColumnType::Boolean),
        ColumnDef::optional("state", ColumnType::Varchar(255)),
    ],
};

pub const COMPANY_UPDATES: ChildTable = ChildTable {
    name: "company_updates",
    id_column: "update_id",
    columns: &[
        ColumnDef::required("article_link", ColumnType::Varchar(500)),
        ColumnDef::required("image", ColumnType::Varchar(500)),
        ColumnDef::required("posted_on", ColumnType::Date),
        ColumnDef::required("update_text", ColumnType::Text),
        ColumnDef::required("total_likes", ColumnType::BigInt),
    ],
};

pub const AFFILIATED_COMPANIES: ChildTable = ChildTable {
    name: "affiliated_companies",
    id_column: "affiliated_companies_id",
    columns: &[
        ColumnDef::required("name", ColumnType::Varchar(500)),
        ColumnDef::required("linkedin_url", ColumnType::Varchar(500)),
        ColumnDef::required("industry", ColumnType::Varchar(500)),
        ColumnDef::required("location", ColumnType::Varchar(500)),
    ],
};

// =============================================================================
// Categories
// =============================================================================

pub const SPECIALITIES_CATEGORY: CategorySpec = CategorySpec {
    name: "specialities",
    source_column: "specialities",
    shape: PayloadShape::List,
    fields: FieldMap {
        fields: &[FieldSpec::text("specialty_name", &[])],
        identity: Some("specialty_name"),
    },
    destination: Destination::Dimension {
        dimension: SPECIALTY,
        junction: JunctionTable {
            name: "company_specialty",
            id_column: "unique_id",
            dimension_column: "specialty_name_id",
        },
    },
};

pub const COMPANY_TYPE_CATEGORY: CategorySpec = CategorySpec {
    name: "company_type",
    source_column: "company_type",
    shape: PayloadShape::Scalar,
    fields: FieldMap {
        fields: &[FieldSpec::text("company_type_name", &[])],
        identity: Some("company_type_name"),
    },
    destination: Destination::Dimension {
        dimension: COMPANY_TYPE,
        junction: JunctionTable {
            name: "company_type",
            id_column: "unique_id",
            dimension_column: "company_type_id",
        },
    },
};

pub const INDUSTRY_CATEGORY: CategorySpec = CategorySpec {
    name: "industry",
    source_column: "industry",
    shape: PayloadShape::Scalar,
    fields: FieldMap {
        fields: &[FieldSpec::text("industry_name", &[])],
        identity: Some("industry_name"),
    },
    destination: Destination::Dimension {
        dimension: INDUSTRY,
        junction: JunctionTable {
            name: "industry_type",
            id_column: "unique_id",
            dimension_column: "industry_id",
        },
    },
};

pub const COMPANY_SIZE_CATEGORY: CategorySpec = CategorySpec {
    name: "company_size",
    source_column: "company_size",
    shape: PayloadShape::Tuple,
    fields: FieldMap {
        fields: &[FieldSpec::size_range("size_range")],
        identity: Some("size_range"),
    },
    destination: Destination::Dimension {
        dimension: SIZE_RANGE,
        junction: JunctionTable {
            name: "company_size_link",
            id_column: "unique_id",
            dimension_column: "size_range_id",
        },
    },
};

pub const LOCATIONS_CATEGORY: CategorySpec = CategorySpec {
    name: "locations",
    source_column: "locations",
    shape: PayloadShape::List,
    fields: FieldMap {
        fields: &[
            FieldSpec::text("country", &["country"]),
            FieldSpec::text("city", &["city"]),
            FieldSpec::text("postal_code", &["postal_code"]),
            FieldSpec::text("address_line1", &["line_1"]),
            FieldSpec::flag("is_hq", &["is_hq"]),
            FieldSpec::text("state", &["state"]),
        ],
        identity: Some("country"),
    },
    destination: Destination::Child(LOCATIONS),
};

pub const UPDATES_CATEGORY: CategorySpec = CategorySpec {
    name: "updates",
    source_column: "updates",
    shape: PayloadShape::List,
    fields: FieldMap {
        fields: &[
            FieldSpec::text_or("article_link", &["article_link"], "No Link Provided"),
            FieldSpec::text_or("image", &["image"], ""),
            FieldSpec::date(
                "posted_on",
                &["posted_on"],
                DateDefaults { year: 1900, month: 1, day: 1 },
            ),
            FieldSpec::text_or("update_text", &["text"], ""),
            FieldSpec::integer_or("total_likes", &["total_likes"], 0),
        ],
        identity: None,
    },
    destination: Destination::Child(COMPANY_UPDATES),
};

pub const AFFILIATED_COMPANIES_CATEGORY: CategorySpec = CategorySpec {
    name: "affiliated_companies",
    source_column: "affiliated_companies",
    shape: PayloadShape::List,
    fields: FieldMap {
        fields: &[
            FieldSpec::text_or("name", &["name"], "No Name Provided"),
            FieldSpec::text_or("linkedin_url", &["link"], "No Link Provided"),
            FieldSpec::text_or("industry", &["industry"], "No Industry Provided"),
            FieldSpec::text_or("location", &["location"], "No Location Provided"),
        ],
        identity: None,
    },
    destination: Destination::Child(AFFILIATED_COMPANIES),
};

pub const SIMILAR_COMPANIES_CATEGORY: CategorySpec = CategorySpec {
    name: "similar_companies",
    source_column: "similar_companies",
    shape: PayloadShape::List,
    fields: FieldMap {
        fields: &[
            FieldSpec::text_or("name", &["name"], "No Name Provided"),
            FieldSpec::text_or("linkedin_url", &["link"], "No Link Provided"),
            FieldSpec::text_or("industry", &["industry"], "No Industry Provided"),
            FieldSpec::text_or("location", &["location"], "No Location Provided"),
        ],
        identity: Some("name"),
    },
    destination: Destination::Dimension {
        dimension: SIMILAR_COMPANY,
        junction: JunctionTable {
            name: "similar_companies_junction",
            id_column: "unique_id",
            dimension_column: "similar_companies_id",
        },
    },
};

/// Owner columns with no destination; they are dropped alongside the migrated ones.
pub const RETIRED_COLUMNS: &[&str] = &[
    "hq",
    "exit_data",
    "acquisitions",
    "extra",
    "funding_data",
    "categories",
    "customer_list",
];

/// Builds the catalog for the company table.
///
/// The owner table name comes from configuration; everything else is fixed.
pub fn company_catalog(owner: OwnerTable) -> MigrationCatalog {
    MigrationCatalog {
        owner,
        categories: vec![
            SPECIALITIES_CATEGORY,
            COMPANY_TYPE_CATEGORY,
            INDUSTRY_CATEGORY,
            COMPANY_SIZE_CATEGORY,
            LOCATIONS_CATEGORY,
            UPDATES_CATEGORY,
            AFFILIATED_COMPANIES_CATEGORY,
            SIMILAR_COMPANIES_CATEGORY,
        ],
        retired_columns: RETIRED_COLUMNS.to_vec(),
    }
}
