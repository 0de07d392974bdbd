//! Source-side value representation.
//!
//! Documents in a schema-less store carry dynamically typed fields. Instead of
//! handing untyped values to the coercer, every field is read through
//! [`SourceDocument::field`], which returns a tagged [`SourceValue`].

use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;
use std::fmt;

/// A dynamically typed field value read from a source document.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceValue {
    /// String value (also used for identifiers, symbols and nested structures
    /// rendered as JSON)
    Text(String),

    /// Integer value of any source width
    Integer(i64),

    /// Floating point value
    Float(f64),

    /// Boolean value
    Boolean(bool),

    /// Calendar date/time with millisecond precision
    Date(DateTime<Utc>),

    /// Replication-style timestamp: epoch seconds plus an ordinal increment
    Timestamp { seconds: u32, increment: u32 },

    /// Raw binary payload
    Binary(Vec<u8>),

    /// Field missing from the document or explicitly null
    Absent,
}

impl SourceValue {
    /// Check if this value is absent (missing or null).
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::Timestamp { .. } => "timestamp",
            Self::Binary(_) => "binary",
            Self::Absent => "absent",
        }
    }

    /// Epoch milliseconds of a timestamp value.
    ///
    /// Timestamps are stored in seconds; the conversion to milliseconds happens
    /// here so callers never construct a time from the raw seconds count.
    pub fn timestamp_millis(&self) -> Option<i64> {
        match self {
            Self::Timestamp { seconds, .. } => Some(i64::from(*seconds) * 1000),
            _ => None,
        }
    }
}

/// Natural string representation, used when binding against text columns and
/// when a numeric conversion falls back to text.
impl fmt::Display for SourceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Date(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Self::Timestamp { seconds, .. } => {
                match DateTime::from_timestamp(i64::from(*seconds), 0) {
                    Some(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
                    None => write!(f, "{seconds}"),
                }
            }
            Self::Binary(bytes) => {
                f.write_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            Self::Absent => Ok(()),
        }
    }
}

impl From<&str> for SourceValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SourceValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for SourceValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for SourceValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for SourceValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for SourceValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for SourceValue {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Date(dt)
    }
}

impl From<Vec<u8>> for SourceValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes)
    }
}

impl<T: Into<SourceValue>> From<Option<T>> for SourceValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Absent)
    }
}

/// Read access to the fields of one source document by name.
pub trait SourceDocument {
    /// Value of the named field, or [`SourceValue::Absent`] when the field is
    /// missing or null.
    fn field(&self, name: &str) -> SourceValue;
}

/// An in-memory document, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentRow {
    fields: HashMap<String, SourceValue>,
}

impl DocumentRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SourceValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SourceValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl SourceDocument for DocumentRow {
    fn field(&self, name: &str) -> SourceValue {
        self.fields.get(name).cloned().unwrap_or(SourceValue::Absent)
    }
}

impl FromIterator<(String, SourceValue)> for DocumentRow {
    fn from_iter<I: IntoIterator<Item = (String, SourceValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
