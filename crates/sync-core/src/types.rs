//! Target column type categories.
//!
//! A [`SqlTypeCategory`] is what the schema probe reports for each mapped
//! column. Database crates map their native types onto these categories; the
//! coercer only ever looks at the category.

use serde::Serialize;
use std::fmt;

/// Storage width of an integer column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IntegerWidth {
    Int16,
    Int32,
    Int64,
}

/// Kind of a floating point / decimal column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FloatKind {
    /// Single precision
    Real,
    /// Double precision
    Double,
    /// Arbitrary precision decimal / numeric
    Numeric,
}

/// SQL type category of a target column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SqlTypeCategory {
    /// Variable, fixed-length and large text
    Text,

    /// Integer of any width
    Integer(IntegerWidth),

    /// Floating point, decimal and numeric
    Float(FloatKind),

    /// Boolean and single-bit
    Boolean,

    /// Date without time of day
    Date,

    /// Full timestamp
    Timestamp {
        /// Whether the column stores an absolute instant (`timestamptz`)
        with_time_zone: bool,
    },

    /// Binary large object
    Blob,

    /// Any type the coercer has no rule for; carries the native type name
    Unrecognized(String),
}

impl SqlTypeCategory {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl fmt::Display for SqlTypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Integer(IntegerWidth::Int16) => f.write_str("integer(16)"),
            Self::Integer(IntegerWidth::Int32) => f.write_str("integer(32)"),
            Self::Integer(IntegerWidth::Int64) => f.write_str("integer(64)"),
            Self::Float(FloatKind::Real) => f.write_str("float(real)"),
            Self::Float(FloatKind::Double) => f.write_str("float(double)"),
            Self::Float(FloatKind::Numeric) => f.write_str("float(numeric)"),
            Self::Boolean => f.write_str("boolean"),
            Self::Date => f.write_str("date"),
            Self::Timestamp {
                with_time_zone: false,
            } => f.write_str("timestamp"),
            Self::Timestamp {
                with_time_zone: true,
            } => f.write_str("timestamptz"),
            Self::Blob => f.write_str("blob"),
            Self::Unrecognized(native) => write!(f, "unrecognized({native})"),
        }
    }
}

/// Probed type of one mapped column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnTypeInfo {
    /// 1-based position in the mapped column list
    pub position: usize,
    /// Column name, taken from the same mapping the probe query was built from
    pub name: String,
    /// Native type name reported by the target database
    pub native_type: String,
    pub category: SqlTypeCategory,
}

impl ColumnTypeInfo {
    pub fn new(
        position: usize,
        name: impl Into<String>,
        native_type: impl Into<String>,
        category: SqlTypeCategory,
    ) -> Self {
        Self {
            position,
            name: name.into(),
            native_type: native_type.into(),
            category,
        }
    }
}
