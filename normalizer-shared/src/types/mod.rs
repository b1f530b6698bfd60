mod category;
mod field;
mod field_set;
mod size_bucket;
mod table;

pub use category::{CategorySpec, Destination, MigrationCatalog, OwnerTable, PayloadShape};
pub use field::{DateDefaults, FieldKind, FieldMap, FieldSpec};
pub use field_set::{FieldSet, FieldValue};
pub use size_bucket::SizeBucket;
pub use table::{ChildTable, ColumnDef, ColumnType, DimensionTable, JunctionTable, ENTRY_ORDINAL_COLUMN};
