//! MongoDB/BSON value conversions for sync-core types.
//!
//! This crate reads BSON documents as [`sync_core::SourceDocument`]s so the
//! coercer never sees a raw `Bson` value.
//!
//! # Modules
//!
//! - [`reverse`] - BSON value → SourceValue conversion
//!
//! # Example
//!
//! ```
//! use bson::doc;
//! use mongodb_types::BsonDocument;
//! use sync_core::{SourceDocument, SourceValue};
//!
//! let doc = BsonDocument::from(doc! { "id": 7, "name": "trial" });
//! assert_eq!(doc.field("id"), SourceValue::Integer(7));
//! assert!(doc.field("missing").is_absent());
//! ```

pub mod reverse;

pub use reverse::{bson_to_source_value, BsonDocument};
