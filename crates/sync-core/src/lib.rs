//! Core types for the mongo-sql-sync framework.
//!
//! This crate provides the foundational types shared by the source, sink and
//! orchestration layers:
//!
//! - [`SchemaCatalog`] / [`TableMapping`] - table → ordered column mapping
//! - [`SourceValue`] / [`SourceDocument`] - tagged field values read from a document store
//! - [`SqlTypeCategory`] / [`ColumnTypeInfo`] - probed target column types
//! - [`CoercedValue`] / [`coerce_value`] - conversion of a source value into a bindable parameter
//! - [`DocumentSource`] / [`RelationalSink`] - the seams implemented by database crates
//!
//! # Architecture
//!
//! ```text
//! sync-core (this crate)
//!    │
//!    ├─── mongodb-types       (BSON → SourceValue)
//!    ├─── mongodb-source      (DocumentSource for MongoDB)
//!    ├─── postgresql-types    (PostgreSQL Type → SqlTypeCategory, CoercedValue → ToSql)
//!    └─── postgresql-sink     (RelationalSink for PostgreSQL)
//! ```
//!
//! # Example
//!
//! ```rust
//! use sync_core::{coerce_value, CoercedValue, IntegerWidth, SourceValue, SqlTypeCategory};
//!
//! let outcome = coerce_value(
//!     &SourceValue::Text("42".to_string()),
//!     &SqlTypeCategory::Integer(IntegerWidth::Int32),
//! )
//! .unwrap();
//! assert_eq!(outcome.value, CoercedValue::Int32(42));
//! ```

pub mod batch;
pub mod catalog;
pub mod coerce;
pub mod traits;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use batch::Batch;
pub use catalog::{CatalogError, CatalogOptions, SchemaCatalog, TableMapping};
pub use coerce::{coerce_row, coerce_value, CoercedValue, Coercion, CoercionError, RowCoercion};
pub use traits::{DocumentCursor, DocumentSource, RelationalSink, SinkError, SourceError};
pub use types::{ColumnTypeInfo, FloatKind, IntegerWidth, SqlTypeCategory};
pub use values::{DocumentRow, SourceDocument, SourceValue};
