//! Value coercion: source field value + target column category → bindable parameter.
//!
//! Rules per category:
//!
//! | Category    | Rule                                                            |
//! |-------------|-----------------------------------------------------------------|
//! | text        | natural string representation                                   |
//! | integer     | parse the string form at the column width, else bind as text    |
//! | float       | parse the string form as a float, else bind as text             |
//! | boolean     | booleans as-is, integers as non-zero, `true`/`false` text        |
//! | date        | date part of the instant (epoch milliseconds)                   |
//! | timestamp   | timestamps scale epoch seconds to milliseconds                  |
//! | blob        | base64 text, bound as a byte sequence                           |
//! | unrecognized| left unbound                                                    |
//!
//! Absent fields always become SQL NULL. Numeric parse failures never abort a
//! row; they fall back to text and are counted in [`Coercion::fell_back`].

use crate::types::{ColumnTypeInfo, FloatKind, IntegerWidth, SqlTypeCategory};
use crate::values::{SourceDocument, SourceValue};
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// A parameter value ready to be bound by a sink.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedValue {
    /// SQL NULL for a missing or null field
    Null,
    /// No rule applies to the column type; nothing meaningful is bound
    Unbound,
    Text(String),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    /// Value for a decimal/numeric column, parsed through `f64`
    Numeric(f64),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    /// Textual byte sequence (base64 of a binary payload)
    TextBytes(Vec<u8>),
}

impl CoercedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Coercion errors. Only raised when a value cannot be interpreted at all for
/// the column; numeric parse failures fall back to text instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    #[error("cannot bind a {found} value to a {category} column")]
    Incompatible {
        found: &'static str,
        category: SqlTypeCategory,
    },

    #[error("column '{column}' (position {position}): {source}")]
    Column {
        column: String,
        position: usize,
        #[source]
        source: Box<CoercionError>,
    },
}

/// Result of coercing one value.
#[derive(Debug, Clone, PartialEq)]
pub struct Coercion {
    pub value: CoercedValue,
    /// The numeric conversion failed and the value was re-bound as text.
    pub fell_back: bool,
}

impl Coercion {
    fn exact(value: CoercedValue) -> Self {
        Self {
            value,
            fell_back: false,
        }
    }

    fn text_fallback(value: &SourceValue) -> Self {
        Self {
            value: CoercedValue::Text(value.to_string()),
            fell_back: true,
        }
    }
}

/// Coerce one source value for a column of the given category.
pub fn coerce_value(
    value: &SourceValue,
    category: &SqlTypeCategory,
) -> Result<Coercion, CoercionError> {
    if value.is_absent() {
        return Ok(Coercion::exact(CoercedValue::Null));
    }

    let incompatible = || CoercionError::Incompatible {
        found: value.kind(),
        category: category.clone(),
    };

    let coerced = match category {
        SqlTypeCategory::Text => CoercedValue::Text(value.to_string()),

        SqlTypeCategory::Integer(width) => {
            return Ok(coerce_integer(value, *width)
                .map(Coercion::exact)
                .unwrap_or_else(|| Coercion::text_fallback(value)));
        }

        SqlTypeCategory::Float(kind) => {
            return Ok(coerce_float(value, *kind)
                .map(Coercion::exact)
                .unwrap_or_else(|| Coercion::text_fallback(value)));
        }

        SqlTypeCategory::Boolean => match value {
            SourceValue::Boolean(b) => CoercedValue::Bool(*b),
            SourceValue::Integer(i) => CoercedValue::Bool(*i != 0),
            SourceValue::Text(s) if s.eq_ignore_ascii_case("true") => CoercedValue::Bool(true),
            SourceValue::Text(s) if s.eq_ignore_ascii_case("false") => CoercedValue::Bool(false),
            _ => return Err(incompatible()),
        },

        SqlTypeCategory::Date => {
            let instant = instant_of(value).ok_or_else(incompatible)?;
            CoercedValue::Date(instant.date_naive())
        }

        SqlTypeCategory::Timestamp { with_time_zone } => {
            let instant = instant_of(value).ok_or_else(incompatible)?;
            if *with_time_zone {
                CoercedValue::TimestampTz(instant)
            } else {
                CoercedValue::Timestamp(instant.naive_utc())
            }
        }

        SqlTypeCategory::Blob => match value {
            SourceValue::Binary(bytes) => CoercedValue::TextBytes(
                base64::engine::general_purpose::STANDARD
                    .encode(bytes)
                    .into_bytes(),
            ),
            _ => return Err(incompatible()),
        },

        SqlTypeCategory::Unrecognized(_) => CoercedValue::Unbound,
    };

    Ok(Coercion::exact(coerced))
}

/// Integer via the value's string form, narrowed to the column width.
fn coerce_integer(value: &SourceValue, width: IntegerWidth) -> Option<CoercedValue> {
    let parsed: i64 = match value {
        SourceValue::Integer(i) => *i,
        other => other.to_string().parse().ok()?,
    };
    match width {
        IntegerWidth::Int16 => i16::try_from(parsed).ok().map(CoercedValue::Int16),
        IntegerWidth::Int32 => i32::try_from(parsed).ok().map(CoercedValue::Int32),
        IntegerWidth::Int64 => Some(CoercedValue::Int64(parsed)),
    }
}

/// Float via the value's string form.
fn coerce_float(value: &SourceValue, kind: FloatKind) -> Option<CoercedValue> {
    let parsed: f64 = value.to_string().parse().ok()?;
    Some(match kind {
        FloatKind::Real => CoercedValue::Float32(parsed as f32),
        FloatKind::Double => CoercedValue::Float64(parsed),
        FloatKind::Numeric => CoercedValue::Numeric(parsed),
    })
}

/// Instant carried by a date or timestamp value.
///
/// Dates are stored in epoch milliseconds; timestamps in epoch seconds, which
/// are scaled to milliseconds before the instant is constructed.
fn instant_of(value: &SourceValue) -> Option<DateTime<Utc>> {
    match value {
        SourceValue::Date(dt) => DateTime::from_timestamp_millis(dt.timestamp_millis()),
        SourceValue::Timestamp { .. } => {
            DateTime::from_timestamp_millis(value.timestamp_millis()?)
        }
        _ => None,
    }
}

/// Parameters for one document, in mapped column order.
#[derive(Debug, Clone, PartialEq)]
pub struct RowCoercion {
    pub values: Vec<CoercedValue>,
    /// Number of values re-bound as text after a numeric conversion failed
    pub fallbacks: usize,
}

/// Coerce every mapped column of a document, in column order.
pub fn coerce_row<D: SourceDocument + ?Sized>(
    doc: &D,
    columns: &[ColumnTypeInfo],
) -> Result<RowCoercion, CoercionError> {
    let mut values = Vec::with_capacity(columns.len());
    let mut fallbacks = 0;

    for column in columns {
        let raw = doc.field(&column.name);
        let coercion =
            coerce_value(&raw, &column.category).map_err(|e| CoercionError::Column {
                column: column.name.clone(),
                position: column.position,
                source: Box::new(e),
            })?;
        if coercion.fell_back {
            tracing::trace!(
                "Column '{}' expects {} but got {:?}; binding as text",
                column.name,
                column.category,
                raw
            );
            fallbacks += 1;
        }
        values.push(coercion.value);
    }

    Ok(RowCoercion { values, fallbacks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::DocumentRow;
    use chrono::TimeZone;

    fn coerce(value: SourceValue, category: SqlTypeCategory) -> Coercion {
        coerce_value(&value, &category).unwrap()
    }

    const INT: SqlTypeCategory = SqlTypeCategory::Integer(IntegerWidth::Int32);
    const DOUBLE: SqlTypeCategory = SqlTypeCategory::Float(FloatKind::Double);
    const TIMESTAMP: SqlTypeCategory = SqlTypeCategory::Timestamp {
        with_time_zone: false,
    };

    #[test]
    fn test_absent_is_null_for_every_category() {
        let categories = [
            SqlTypeCategory::Text,
            INT,
            DOUBLE,
            SqlTypeCategory::Boolean,
            SqlTypeCategory::Date,
            TIMESTAMP,
            SqlTypeCategory::Blob,
            SqlTypeCategory::Unrecognized("uuid".to_string()),
        ];
        for category in categories {
            assert_eq!(
                coerce(SourceValue::Absent, category).value,
                CoercedValue::Null
            );
        }
    }

    #[test]
    fn test_text_uses_natural_representation() {
        assert_eq!(
            coerce(SourceValue::Integer(7), SqlTypeCategory::Text).value,
            CoercedValue::Text("7".to_string())
        );
        assert_eq!(
            coerce(SourceValue::Boolean(false), SqlTypeCategory::Text).value,
            CoercedValue::Text("false".to_string())
        );
    }

    #[test]
    fn test_integer_from_integer_and_text() {
        assert_eq!(
            coerce(SourceValue::Integer(7), INT),
            Coercion::exact(CoercedValue::Int32(7))
        );
        assert_eq!(
            coerce(SourceValue::from("42"), SqlTypeCategory::Integer(IntegerWidth::Int64)).value,
            CoercedValue::Int64(42)
        );
        assert_eq!(
            coerce(SourceValue::Float(3.0), INT).value,
            CoercedValue::Int32(3)
        );
    }

    #[test]
    fn test_integer_falls_back_to_text() {
        let c = coerce(SourceValue::from("abc"), INT);
        assert!(c.fell_back);
        assert_eq!(c.value, CoercedValue::Text("abc".to_string()));

        let c = coerce(SourceValue::Float(2.5), INT);
        assert!(c.fell_back);
        assert_eq!(c.value, CoercedValue::Text("2.5".to_string()));
    }

    #[test]
    fn test_integer_out_of_range_falls_back_to_text() {
        let c = coerce(
            SourceValue::Integer(70_000),
            SqlTypeCategory::Integer(IntegerWidth::Int16),
        );
        assert!(c.fell_back);
        assert_eq!(c.value, CoercedValue::Text("70000".to_string()));
    }

    #[test]
    fn test_float_from_text_and_integer() {
        assert_eq!(
            coerce(SourceValue::from("1.25"), DOUBLE).value,
            CoercedValue::Float64(1.25)
        );
        assert_eq!(
            coerce(SourceValue::Integer(3), SqlTypeCategory::Float(FloatKind::Real)).value,
            CoercedValue::Float32(3.0)
        );
        assert_eq!(
            coerce(SourceValue::Float(9.5), SqlTypeCategory::Float(FloatKind::Numeric)).value,
            CoercedValue::Numeric(9.5)
        );
    }

    #[test]
    fn test_float_falls_back_to_text() {
        let c = coerce(SourceValue::from("abc"), DOUBLE);
        assert!(c.fell_back);
        assert_eq!(c.value, CoercedValue::Text("abc".to_string()));
    }

    #[test]
    fn test_boolean() {
        let b = SqlTypeCategory::Boolean;
        assert_eq!(coerce(SourceValue::Boolean(true), b.clone()).value, CoercedValue::Bool(true));
        assert_eq!(coerce(SourceValue::Integer(0), b.clone()).value, CoercedValue::Bool(false));
        assert_eq!(coerce(SourceValue::from("TRUE"), b.clone()).value, CoercedValue::Bool(true));

        let err = coerce_value(&SourceValue::from("yes"), &b).unwrap_err();
        assert!(matches!(err, CoercionError::Incompatible { found: "text", .. }));
    }

    #[test]
    fn test_date_keeps_date_part() {
        let dt = Utc.with_ymd_and_hms(2024, 6, 15, 23, 59, 59).unwrap();
        assert_eq!(
            coerce(SourceValue::Date(dt), SqlTypeCategory::Date).value,
            CoercedValue::Date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
        );
    }

    #[test]
    fn test_timestamp_scales_seconds_to_millis() {
        let c = coerce(
            SourceValue::Timestamp {
                seconds: 1000,
                increment: 3,
            },
            TIMESTAMP,
        );
        match c.value {
            CoercedValue::Timestamp(ts) => {
                assert_eq!(ts.and_utc().timestamp_millis(), 1_000_000);
            }
            other => panic!("Expected Timestamp, got {other:?}"),
        }
    }

    #[test]
    fn test_timestamp_with_time_zone() {
        let c = coerce(
            SourceValue::Timestamp {
                seconds: 1000,
                increment: 0,
            },
            SqlTypeCategory::Timestamp {
                with_time_zone: true,
            },
        );
        assert_eq!(
            c.value,
            CoercedValue::TimestampTz(DateTime::from_timestamp_millis(1_000_000).unwrap())
        );
    }

    #[test]
    fn test_date_value_into_timestamp_column() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            coerce(SourceValue::Date(dt), TIMESTAMP).value,
            CoercedValue::Timestamp(dt.naive_utc())
        );
    }

    #[test]
    fn test_text_into_date_is_incompatible() {
        let err = coerce_value(&SourceValue::from("2024-01-01"), &SqlTypeCategory::Date).unwrap_err();
        assert_eq!(
            err,
            CoercionError::Incompatible {
                found: "text",
                category: SqlTypeCategory::Date
            }
        );
    }

    #[test]
    fn test_blob_is_base64_text_bytes() {
        let c = coerce(
            SourceValue::Binary(vec![0xDE, 0xAD, 0xBE, 0xEF]),
            SqlTypeCategory::Blob,
        );
        assert_eq!(c.value, CoercedValue::TextBytes(b"3q2+7w==".to_vec()));
    }

    #[test]
    fn test_unrecognized_is_unbound() {
        let c = coerce(
            SourceValue::from("x"),
            SqlTypeCategory::Unrecognized("uuid".to_string()),
        );
        assert_eq!(c.value, CoercedValue::Unbound);
        assert!(!c.fell_back);
    }

    #[test]
    fn test_coerce_row_follows_column_order() {
        let doc = DocumentRow::new()
            .with("name", "trial")
            .with("id", 7i64)
            .with("price", "abc");
        let columns = vec![
            ColumnTypeInfo::new(1, "id", "int4", INT),
            ColumnTypeInfo::new(2, "name", "varchar", SqlTypeCategory::Text),
            ColumnTypeInfo::new(3, "price", "float8", DOUBLE),
            ColumnTypeInfo::new(4, "note", "text", SqlTypeCategory::Text),
        ];

        let row = coerce_row(&doc, &columns).unwrap();
        assert_eq!(
            row.values,
            vec![
                CoercedValue::Int32(7),
                CoercedValue::Text("trial".to_string()),
                CoercedValue::Text("abc".to_string()),
                CoercedValue::Null,
            ]
        );
        assert_eq!(row.fallbacks, 1);
    }

    #[test]
    fn test_coerce_row_reports_column() {
        let doc = DocumentRow::new().with("created", "yesterday");
        let columns = vec![ColumnTypeInfo::new(1, "created", "date", SqlTypeCategory::Date)];

        let err = coerce_row(&doc, &columns).unwrap_err();
        assert!(err.to_string().starts_with("column 'created' (position 1)"));
    }
}
