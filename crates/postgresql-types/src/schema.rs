//! PostgreSQL column type → [`SqlTypeCategory`].
//!
//! The probe reports a `tokio_postgres::types::Type` per result column; only
//! its name is needed to pick a category.

use sync_core::{FloatKind, IntegerWidth, SqlTypeCategory};
use tokio_postgres::types::Type;

/// Category of a column type reported by a prepared statement.
pub fn postgresql_type_to_category(ty: &Type) -> SqlTypeCategory {
    postgresql_type_name_to_category(ty.name())
}

/// Category of a PostgreSQL type name.
///
/// Accepts both internal names (`int4`, `bpchar`) and the SQL spellings
/// used by `information_schema` (`integer`, `character varying`). Anything
/// else, including arrays, domains and enums, is unrecognized.
///
/// # Example
///
/// ```
/// use postgresql_types::postgresql_type_name_to_category;
/// use sync_core::{FloatKind, SqlTypeCategory};
///
/// assert_eq!(
///     postgresql_type_name_to_category("double precision"),
///     SqlTypeCategory::Float(FloatKind::Double)
/// );
/// assert!(!postgresql_type_name_to_category("uuid").is_recognized());
/// ```
pub fn postgresql_type_name_to_category(type_name: &str) -> SqlTypeCategory {
    match type_name.to_lowercase().as_str() {
        // Text types
        "text" | "varchar" | "character varying" | "bpchar" | "character" | "char" | "name" => {
            SqlTypeCategory::Text
        }

        // Integer types
        "int2" | "smallint" => SqlTypeCategory::Integer(IntegerWidth::Int16),
        "int4" | "integer" | "int" => SqlTypeCategory::Integer(IntegerWidth::Int32),
        "int8" | "bigint" => SqlTypeCategory::Integer(IntegerWidth::Int64),

        // Floating point and decimal
        "float4" | "real" => SqlTypeCategory::Float(FloatKind::Real),
        "float8" | "double precision" => SqlTypeCategory::Float(FloatKind::Double),
        "numeric" | "decimal" => SqlTypeCategory::Float(FloatKind::Numeric),

        // Boolean and single bit
        "bool" | "boolean" | "bit" => SqlTypeCategory::Boolean,

        // Date/time
        "date" => SqlTypeCategory::Date,
        "timestamp" | "timestamp without time zone" => SqlTypeCategory::Timestamp {
            with_time_zone: false,
        },
        "timestamptz" | "timestamp with time zone" => SqlTypeCategory::Timestamp {
            with_time_zone: true,
        },

        // Binary
        "bytea" => SqlTypeCategory::Blob,

        other => SqlTypeCategory::Unrecognized(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_types() {
        for ty in [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME, Type::CHAR] {
            assert_eq!(postgresql_type_to_category(&ty), SqlTypeCategory::Text, "{ty}");
        }
    }

    #[test]
    fn test_numeric_types() {
        assert_eq!(
            postgresql_type_to_category(&Type::INT2),
            SqlTypeCategory::Integer(IntegerWidth::Int16)
        );
        assert_eq!(
            postgresql_type_to_category(&Type::INT8),
            SqlTypeCategory::Integer(IntegerWidth::Int64)
        );
        assert_eq!(
            postgresql_type_to_category(&Type::FLOAT4),
            SqlTypeCategory::Float(FloatKind::Real)
        );
        assert_eq!(
            postgresql_type_to_category(&Type::NUMERIC),
            SqlTypeCategory::Float(FloatKind::Numeric)
        );
    }

    #[test]
    fn test_temporal_and_binary_types() {
        assert_eq!(postgresql_type_to_category(&Type::DATE), SqlTypeCategory::Date);
        assert_eq!(
            postgresql_type_to_category(&Type::TIMESTAMP),
            SqlTypeCategory::Timestamp {
                with_time_zone: false
            }
        );
        assert_eq!(
            postgresql_type_to_category(&Type::TIMESTAMPTZ),
            SqlTypeCategory::Timestamp {
                with_time_zone: true
            }
        );
        assert_eq!(postgresql_type_to_category(&Type::BYTEA), SqlTypeCategory::Blob);
        assert_eq!(postgresql_type_to_category(&Type::BIT), SqlTypeCategory::Boolean);
    }

    #[test]
    fn test_unrecognized_types_keep_their_name() {
        assert_eq!(
            postgresql_type_to_category(&Type::JSONB),
            SqlTypeCategory::Unrecognized("jsonb".to_string())
        );
        assert_eq!(
            postgresql_type_to_category(&Type::INT4_ARRAY),
            SqlTypeCategory::Unrecognized("_int4".to_string())
        );
    }

    #[test]
    fn test_sql_spellings() {
        assert_eq!(
            postgresql_type_name_to_category("CHARACTER VARYING"),
            SqlTypeCategory::Text
        );
        assert_eq!(
            postgresql_type_name_to_category("timestamp with time zone"),
            SqlTypeCategory::Timestamp {
                with_time_zone: true
            }
        );
    }
}
