use chrono::NaiveDate;
use serde::Serialize;

/// A coerced column value ready to be bound into a statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Integer(i64),
    Date(NaiveDate),
    Null,
}

/// The ordered column/value pairs extracted from one payload entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSet {
    values: Vec<(&'static str, FieldValue)>,
}

impl FieldSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { values: Vec::with_capacity(capacity) }
    }

    pub fn push(&mut self, column: &'static str, value: FieldValue) {
        self.values.push((column, value));
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, FieldValue)> {
        self.values.iter()
    }
}

impl FromIterator<(&'static str, FieldValue)> for FieldSet {
    fn from_iter<T: IntoIterator<Item = (&'static str, FieldValue)>>(iter: T) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}
