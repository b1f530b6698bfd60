use crate::types::{ChildTable, ColumnDef, DimensionTable, FieldMap, JunctionTable};

/// How a source column holds its entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadShape {
    /// A plain value (e.g. a text column); the value itself is the single entry.
    Scalar,
    /// A JSON value that is one entry on its own, such as a `[low, high]` pair.
    Tuple,
    /// A JSON array with one entry per element.
    List,
}

/// Where the entries of a category end up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Destination {
    Dimension {
        dimension: DimensionTable,
        junction: JunctionTable,
    },
    Child(ChildTable),
}

impl Destination {
    /// The destination column a field is written to.
    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        let columns = match self {
            Destination::Dimension { dimension, .. } => dimension.columns,
            Destination::Child(child) => child.columns,
        };
        columns.iter().find(|column| column.name == name)
    }
}

/// One nested-attribute category of the owning table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategorySpec {
    pub name: &'static str,
    pub source_column: &'static str,
    pub shape: PayloadShape,
    pub fields: FieldMap,
    pub destination: Destination,
}

/// The denormalized table being migrated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnerTable {
    pub name: String,
    /// Surrogate identifier added during the schema phase.
    pub id_column: String,
    /// Table renamed to `name` when the owning table does not exist yet.
    pub staging_name: Option<String>,
}

impl OwnerTable {
    pub fn new(name: impl Into<String>, id_column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_column: id_column.into(),
            staging_name: None,
        }
    }

    pub fn with_staging(mut self, staging_name: impl Into<String>) -> Self {
        self.staging_name = Some(staging_name.into());
        self
    }
}

/// Everything the orchestrator needs to know about one migration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationCatalog {
    pub owner: OwnerTable,
    /// Processed in order; each one is its own phase.
    pub categories: Vec<CategorySpec>,
    /// Columns dropped at the end without being migrated anywhere.
    pub retired_columns: Vec<&'static str>,
}

impl MigrationCatalog {
    /// Every owner column removed by the prune phase, in drop order.
    pub fn pruned_columns(&self) -> Vec<&'static str> {
        self.categories
            .iter()
            .map(|category| category.source_column)
            .chain(self.retired_columns.iter().copied())
            .collect()
    }
}
