/// Column recording the position of a child row inside its source payload.
///
/// Together with the owner identifier it forms the natural key of every child
/// table, which is what lets a re-run skip rows it already wrote.
pub const ENTRY_ORDINAL_COLUMN: &str = "entry_ordinal";

/// SQL type of a destination column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Varchar(u16),
    Text,
    Boolean,
    BigInt,
    Date,
}

impl ColumnType {
    /// Longest text the column accepts, in characters.
    pub fn max_chars(self) -> Option<usize> {
        match self {
            ColumnType::Varchar(width) => Some(usize::from(width)),
            _ => None,
        }
    }
}

/// A single column in a destination table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

impl ColumnDef {
    pub const fn required(name: &'static str, ty: ColumnType) -> Self {
        Self { name, ty, nullable: false }
    }

    pub const fn optional(name: &'static str, ty: ColumnType) -> Self {
        Self { name, ty, nullable: true }
    }
}

/// A deduplicated lookup table.
///
/// Every column in `columns` is part of the natural key: a row is unique over
/// the full tuple, and the surrogate `id_column` is what junctions reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DimensionTable {
    pub name: &'static str,
    pub id_column: &'static str,
    pub columns: &'static [ColumnDef],
}

impl DimensionTable {
    pub fn key_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|column| column.name)
    }
}

/// A many-to-many link between the owning table and a dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JunctionTable {
    pub name: &'static str,
    pub id_column: &'static str,
    /// Column holding the referenced dimension identifier.
    pub dimension_column: &'static str,
}

/// A table of rows owned by exactly one owning record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChildTable {
    pub name: &'static str,
    pub id_column: &'static str,
    pub columns: &'static [ColumnDef],
}
