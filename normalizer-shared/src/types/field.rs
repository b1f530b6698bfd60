/// Defaults substituted for missing date parts before the date is assembled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateDefaults {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl Default for DateDefaults {
    fn default() -> Self {
        Self { year: 1900, month: 1, day: 1 }
    }
}

/// How a raw JSON value is coerced into a column value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed text. `default` replaces an absent or null value; without one the
    /// column receives NULL.
    Text { default: Option<&'static str> },
    /// `"true"` or `"1"` is true, anything else (including absence) is false.
    Flag,
    /// Whole number, `default` when absent.
    Integer { default: i64 },
    /// An object with `year`, `month` and `day` members combined into a date.
    Date(DateDefaults),
    /// A `[low, high]` pair mapped onto a [`SizeBucket`](crate::types::SizeBucket) label.
    SizeRange,
}

/// One destination column and where its value comes from inside a payload entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub column: &'static str,
    /// Object path inside the entry. An empty path reads the entry itself.
    pub path: &'static [&'static str],
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn text(column: &'static str, path: &'static [&'static str]) -> Self {
        Self { column, path, kind: FieldKind::Text { default: None } }
    }

    pub const fn text_or(
        column: &'static str,
        path: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self { column, path, kind: FieldKind::Text { default: Some(default) } }
    }

    pub const fn flag(column: &'static str, path: &'static [&'static str]) -> Self {
        Self { column, path, kind: FieldKind::Flag }
    }

    pub const fn integer_or(column: &'static str, path: &'static [&'static str], default: i64) -> Self {
        Self { column, path, kind: FieldKind::Integer { default } }
    }

    pub const fn date(column: &'static str, path: &'static [&'static str], defaults: DateDefaults) -> Self {
        Self { column, path, kind: FieldKind::Date(defaults) }
    }

    pub const fn size_range(column: &'static str) -> Self {
        Self { column, path: &[], kind: FieldKind::SizeRange }
    }
}

/// The declarative description of what to pull out of each payload entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldMap {
    pub fields: &'static [FieldSpec],
    /// Column whose trimmed value must be non-empty for the entry to be kept.
    pub identity: Option<&'static str>,
}
