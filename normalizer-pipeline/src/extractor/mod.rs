//! This module turns one nested attribute payload into flat field-sets.
//!
//! A payload is decoded according to the category's [`PayloadShape`] into a
//! list of entries, and every entry is run through the category's
//! [`FieldMap`]. The result is a lazy sequence with one item per entry, in
//! payload order, so the entry ordinal can key child rows.
use chrono::NaiveDate;
use normalizer_shared::types::{
    CategorySpec, DateDefaults, Destination, FieldKind, FieldMap, FieldSet, FieldSpec, FieldValue, PayloadShape,
    SizeBucket,
};
use serde_json::{Map, Value as JsonValue};

use crate::errors::ExtractionError;

/// A payload entry that survived extraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedEntry {
    /// Zero-based position of the entry inside its payload.
    pub ordinal: i32,
    pub fields: FieldSet,
}

/// The outcome for one payload entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extracted {
    Entry(ExtractedEntry),
    /// Blank identity field, or a size pair that matches no bucket.
    Discarded { ordinal: i32 },
}

/// Lazy sequence of extraction outcomes, see [`extract`].
pub struct Entries<'a> {
    entries: std::iter::Enumerate<std::vec::IntoIter<JsonValue>>,
    category: &'a CategorySpec,
}

impl Iterator for Entries<'_> {
    type Item = Result<Extracted, ExtractionError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, entry) = self.entries.next()?;
        // Bounded by the length check in `extract`.
        Some(extract_entry(
            index as i32,
            &entry,
            &self.category.fields,
            &self.category.destination,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

/// Extracts the entries of `payload` for `category`.
///
/// An absent, null or empty payload yields an empty sequence, whether it is an
/// empty string, an empty array or an empty object. Payloads stored
/// as text are parsed as JSON when the category expects a list or a pair.
///
/// # Returns
///
/// * `Ok(Entries)` - One item per entry; an `Err` item is an entry that could
///   not be coerced and should be skipped
/// * `Err(ExtractionError)` - The payload as a whole is unreadable
pub fn extract<'a>(
    payload: Option<&JsonValue>,
    category: &'a CategorySpec,
) -> Result<Entries<'a>, ExtractionError> {
    let entries = decode_entries(payload, category.shape)?;
    if i32::try_from(entries.len()).is_err() {
        return Err(ExtractionError::TooManyEntries);
    }

    Ok(Entries {
        entries: entries.into_iter().enumerate(),
        category,
    })
}

fn kind_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn shape_name(shape: PayloadShape) -> &'static str {
    match shape {
        PayloadShape::Scalar => "scalar",
        PayloadShape::Tuple => "pair",
        PayloadShape::List => "list",
    }
}

fn unexpected(shape: PayloadShape, found: &JsonValue) -> ExtractionError {
    ExtractionError::UnexpectedShape {
        expected: shape_name(shape),
        found: kind_name(found),
    }
}

fn decode_entries(payload: Option<&JsonValue>, shape: PayloadShape) -> Result<Vec<JsonValue>, ExtractionError> {
    let Some(payload) = payload else {
        return Ok(Vec::new());
    };

    match (shape, payload) {
        (_, JsonValue::Null) => Ok(Vec::new()),
        (PayloadShape::Scalar, JsonValue::Array(_) | JsonValue::Object(_)) => Err(unexpected(shape, payload)),
        (PayloadShape::Scalar, value) => Ok(vec![value.clone()]),
        (_, JsonValue::Array(items)) if items.is_empty() => Ok(Vec::new()),
        (_, JsonValue::Object(fields)) if fields.is_empty() => Ok(Vec::new()),
        (_, JsonValue::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(Vec::new());
            }
            let parsed: JsonValue =
                serde_json::from_str(text).map_err(|e| ExtractionError::InvalidJson(e.to_string()))?;
            if parsed.is_string() {
                return Err(unexpected(shape, &parsed));
            }
            decode_entries(Some(&parsed), shape)
        }
        (PayloadShape::Tuple, JsonValue::Array(_)) => Ok(vec![payload.clone()]),
        (PayloadShape::List, JsonValue::Array(items)) => Ok(items.clone()),
        (_, value) => Err(unexpected(shape, value)),
    }
}

fn extract_entry(
    ordinal: i32,
    entry: &JsonValue,
    map: &FieldMap,
    destination: &Destination,
) -> Result<Extracted, ExtractionError> {
    let mut fields = FieldSet::with_capacity(map.fields.len());

    for spec in map.fields {
        let raw = lookup(entry, spec.path);
        // Checked on the raw value so a default never rescues a blank identity.
        if map.identity == Some(spec.column) && !has_identity(raw) {
            return Ok(Extracted::Discarded { ordinal });
        }

        let value = coerce(spec, raw)
            .and_then(|value| fits_column(value, destination, spec.column))
            .map_err(|reason| ExtractionError::InvalidField {
                ordinal,
                column: spec.column,
                reason,
            })?;
        match value {
            Some(value) => fields.push(spec.column, value),
            None => return Ok(Extracted::Discarded { ordinal }),
        }
    }

    Ok(Extracted::Entry(ExtractedEntry { ordinal, fields }))
}

/// Rejects text longer than the destination column holds.
fn fits_column(
    value: Option<FieldValue>,
    destination: &Destination,
    column: &str,
) -> Result<Option<FieldValue>, String> {
    let width = destination.column(column).and_then(|column| column.ty.max_chars());
    if let (Some(FieldValue::Text(text)), Some(width)) = (&value, width) {
        let length = text.chars().count();
        if length > width {
            return Err(format!("{length} characters exceed the column width of {width}"));
        }
    }
    Ok(value)
}

/// Follows `path` into `entry`. JSON null reads as absent.
fn lookup<'v>(entry: &'v JsonValue, path: &[&str]) -> Option<&'v JsonValue> {
    path.iter()
        .try_fold(entry, |value, key| value.get(*key))
        .filter(|value| !value.is_null())
}

fn has_identity(raw: Option<&JsonValue>) -> bool {
    match raw {
        None => false,
        Some(JsonValue::String(text)) => !text.trim().is_empty(),
        Some(_) => true,
    }
}

/// `Ok(None)` excludes the whole entry.
fn coerce(spec: &FieldSpec, raw: Option<&JsonValue>) -> Result<Option<FieldValue>, String> {
    let value = match spec.kind {
        FieldKind::Text { default } => match text_of(raw)? {
            Some(text) => FieldValue::Text(text),
            None => default.map_or(FieldValue::Null, |text| FieldValue::Text(text.to_string())),
        },
        FieldKind::Flag => FieldValue::Flag(is_truthy(raw)),
        FieldKind::Integer { default } => FieldValue::Integer(whole_number(raw)?.unwrap_or(default)),
        FieldKind::Date(defaults) => FieldValue::Date(date_of(raw, defaults)?),
        FieldKind::SizeRange => match size_bucket_of(raw)? {
            Some(bucket) => FieldValue::Text(bucket.label().to_string()),
            None => return Ok(None),
        },
    };

    Ok(Some(value))
}

fn text_of(raw: Option<&JsonValue>) -> Result<Option<String>, String> {
    match raw {
        None => Ok(None),
        Some(JsonValue::String(text)) => Ok(Some(text.trim().to_string())),
        Some(JsonValue::Number(number)) => Ok(Some(number.to_string())),
        Some(JsonValue::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(other) => Err(format!("expected text, found {}", kind_name(other))),
    }
}

fn is_truthy(raw: Option<&JsonValue>) -> bool {
    match raw {
        Some(JsonValue::String(text)) => matches!(text.trim(), "true" | "1"),
        Some(JsonValue::Bool(flag)) => *flag,
        Some(JsonValue::Number(number)) => number.as_i64() == Some(1),
        _ => false,
    }
}

/// Reads a whole number from a JSON number or numeric string. Blank strings
/// read as absent.
fn whole_number(raw: Option<&JsonValue>) -> Result<Option<i64>, String> {
    match raw {
        None => Ok(None),
        Some(JsonValue::Number(number)) => match number.as_i64() {
            Some(value) => Ok(Some(value)),
            None => number
                .as_f64()
                .filter(|value| value.fract() == 0.0 && value.abs() < i64::MAX as f64)
                .map(|value| Some(value as i64))
                .ok_or_else(|| format!("{number} is not a whole number")),
        },
        Some(JsonValue::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<i64>()
                .map(Some)
                .map_err(|_| format!("{text:?} is not a whole number"))
        }
        Some(other) => Err(format!("expected a number, found {}", kind_name(other))),
    }
}

fn date_part(parts: &Map<String, JsonValue>, key: &str) -> Result<Option<i64>, String> {
    whole_number(parts.get(key).filter(|value| !value.is_null()))
}

fn date_of(raw: Option<&JsonValue>, defaults: DateDefaults) -> Result<NaiveDate, String> {
    let (year, month, day) = match raw {
        None => (None, None, None),
        Some(JsonValue::Object(parts)) => (
            date_part(parts, "year")?,
            date_part(parts, "month")?,
            date_part(parts, "day")?,
        ),
        Some(JsonValue::String(text)) => {
            return NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                .map_err(|e| format!("invalid date {text:?}: {e}"));
        }
        Some(other) => return Err(format!("expected date parts, found {}", kind_name(other))),
    };

    let year = match year {
        Some(year) => i32::try_from(year).map_err(|_| format!("year {year} out of range"))?,
        None => defaults.year,
    };
    let month = match month {
        Some(month) => u32::try_from(month).map_err(|_| format!("month {month} out of range"))?,
        None => defaults.month,
    };
    let day = match day {
        Some(day) => u32::try_from(day).map_err(|_| format!("day {day} out of range"))?,
        None => defaults.day,
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| format!("no such date {year}-{month}-{day}"))
}

/// Maps a `[low, high]` pair onto its bucket. `Ok(None)` for pairs that match
/// no bucket, including a missing lower bound.
fn size_bucket_of(raw: Option<&JsonValue>) -> Result<Option<SizeBucket>, String> {
    let bounds = match raw {
        Some(JsonValue::Array(bounds)) => bounds,
        Some(other) => return Err(format!("expected [low, high], found {}", kind_name(other))),
        None => return Ok(None),
    };
    let [low, high] = bounds.as_slice() else {
        return Err(format!("expected two bounds, found {}", bounds.len()));
    };

    let low = whole_number(Some(low).filter(|value| !value.is_null()))?;
    let high = whole_number(Some(high).filter(|value| !value.is_null()))?;

    Ok(low.and_then(|low| SizeBucket::from_bounds(low, high)))
}
