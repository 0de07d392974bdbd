//! MongoDB document source for mongo-sql-sync
//!
//! Provides forward-only cursors over the collections of one database.

mod cursor;

pub use cursor::{connect, MongoDocumentCursor, MongoDocumentSource, SourceOpts};
