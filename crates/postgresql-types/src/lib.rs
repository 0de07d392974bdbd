//! PostgreSQL type conversions for sync-core types.
//!
//! This crate maps PostgreSQL column types onto sync-core's
//! [`SqlTypeCategory`](sync_core::SqlTypeCategory) and turns coerced values
//! into parameters `tokio-postgres` can bind.
//!
//! # Modules
//!
//! - [`schema`] - PostgreSQL type → SqlTypeCategory
//! - [`forward`] - CoercedValue → PostgreSQL value conversion
//!
//! # Example
//!
//! ```
//! use postgresql_types::{postgresql_type_to_category, PostgreSQLValue};
//! use sync_core::{CoercedValue, IntegerWidth, SqlTypeCategory};
//! use tokio_postgres::types::Type;
//!
//! assert_eq!(
//!     postgresql_type_to_category(&Type::INT4),
//!     SqlTypeCategory::Integer(IntegerWidth::Int32)
//! );
//!
//! let pg_val: PostgreSQLValue = CoercedValue::Int32(7).into();
//! assert!(matches!(pg_val, PostgreSQLValue::Int32(7)));
//! ```

pub mod forward;
pub mod schema;

pub use forward::{row_to_postgresql, PostgreSQLValue};
pub use schema::{postgresql_type_name_to_category, postgresql_type_to_category};
