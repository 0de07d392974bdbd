//! Forward conversion: CoercedValue → PostgreSQL value
//!
//! This module implements `From<CoercedValue>` for `PostgreSQLValue` and binds
//! the result through `ToSql`, so a whole row can be passed to
//! `tokio-postgres` as one parameter slice.

use bytes::{BufMut, BytesMut};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use postgres_types::{Format, IsNull, ToSql, Type};
use rust_decimal::Decimal;
use std::error::Error;
use sync_core::CoercedValue;

/// PostgreSQL value wrapper for type-safe conversions.
#[derive(Debug, Clone, PartialEq)]
pub enum PostgreSQLValue {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 32-bit floating point
    Float32(f32),
    /// 64-bit floating point
    Float64(f64),
    /// Decimal value
    Decimal(Decimal),
    /// Text/string value
    Text(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Date value (no time)
    Date(NaiveDate),
    /// Timestamp without timezone
    Timestamp(NaiveDateTime),
    /// Timestamp with timezone
    TimestampTz(DateTime<Utc>),
}

impl From<CoercedValue> for PostgreSQLValue {
    fn from(value: CoercedValue) -> Self {
        match value {
            // Every placeholder must be bound; unbound columns receive NULL
            CoercedValue::Null | CoercedValue::Unbound => PostgreSQLValue::Null,
            CoercedValue::Text(s) => PostgreSQLValue::Text(s),
            CoercedValue::Int16(i) => PostgreSQLValue::Int16(i),
            CoercedValue::Int32(i) => PostgreSQLValue::Int32(i),
            CoercedValue::Int64(i) => PostgreSQLValue::Int64(i),
            CoercedValue::Float32(f) => PostgreSQLValue::Float32(f),
            CoercedValue::Float64(f) => PostgreSQLValue::Float64(f),
            CoercedValue::Numeric(f) => {
                let s = numeric_literal(f);
                match Decimal::from_str_exact(&s) {
                    Ok(d) => PostgreSQLValue::Decimal(d),
                    // Out of range or too many digits for Decimal; the server parses it
                    Err(_) => PostgreSQLValue::Text(s),
                }
            }
            CoercedValue::Bool(b) => PostgreSQLValue::Bool(b),
            CoercedValue::Date(d) => PostgreSQLValue::Date(d),
            CoercedValue::Timestamp(ts) => PostgreSQLValue::Timestamp(ts),
            CoercedValue::TimestampTz(ts) => PostgreSQLValue::TimestampTz(ts),
            CoercedValue::TextBytes(b) => PostgreSQLValue::Bytes(b),
        }
    }
}

impl ToSql for PostgreSQLValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            PostgreSQLValue::Null => Ok(IsNull::Yes),
            PostgreSQLValue::Bool(b) if *ty == Type::BIT => {
                encode_single_bit(*b, out);
                Ok(IsNull::No)
            }
            PostgreSQLValue::Bool(b) => b.to_sql_checked(ty, out),
            PostgreSQLValue::Int16(i) => i.to_sql_checked(ty, out),
            PostgreSQLValue::Int32(i) => i.to_sql_checked(ty, out),
            PostgreSQLValue::Int64(i) => i.to_sql_checked(ty, out),
            PostgreSQLValue::Float32(f) => f.to_sql_checked(ty, out),
            PostgreSQLValue::Float64(f) => f.to_sql_checked(ty, out),
            PostgreSQLValue::Decimal(d) => d.to_sql_checked(ty, out),
            // The internal single-byte "char" type
            PostgreSQLValue::Text(s) if *ty == Type::CHAR => {
                let byte = s.bytes().next().unwrap_or(0) as i8;
                byte.to_sql_checked(ty, out)
            }
            PostgreSQLValue::Text(s) if binds_as_literal(ty) => {
                out.put_slice(s.as_bytes());
                Ok(IsNull::No)
            }
            PostgreSQLValue::Text(s) => s.to_sql_checked(ty, out),
            PostgreSQLValue::Bytes(b) => b.to_sql_checked(ty, out),
            PostgreSQLValue::Date(d) => d.to_sql_checked(ty, out),
            PostgreSQLValue::Timestamp(ts) => ts.to_sql_checked(ty, out),
            PostgreSQLValue::TimestampTz(ts) => ts.to_sql_checked(ty, out),
        }
    }

    fn accepts(_: &Type) -> bool {
        true
    }

    /// Text bound to a non-text column is sent in text format so the server
    /// applies its own input conversion for that column type.
    fn encode_format(&self, ty: &Type) -> Format {
        match self {
            PostgreSQLValue::Text(_) if binds_as_literal(ty) => Format::Text,
            _ => Format::Binary,
        }
    }

    postgres_types::to_sql_checked!();
}

fn binds_as_literal(ty: &Type) -> bool {
    *ty != Type::CHAR && !<String as ToSql>::accepts(ty)
}

/// Decimal literal for a numeric column. Infinities use the spelling
/// `numeric` accepts; `f64`'s `Display` never uses exponent notation.
fn numeric_literal(f: f64) -> String {
    if f == f64::INFINITY {
        "Infinity".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        f.to_string()
    }
}

/// Binary wire format of `bit(1)`: bit length followed by the packed bits.
fn encode_single_bit(value: bool, out: &mut BytesMut) {
    out.put_i32(1);
    out.put_u8(if value { 0x80 } else { 0x00 });
}

/// Convert a coerced row into bindable PostgreSQL values.
pub fn row_to_postgresql(values: &[CoercedValue]) -> Vec<PostgreSQLValue> {
    values.iter().cloned().map(PostgreSQLValue::from).collect()
}
