//! Seams between the migration loop and concrete databases.
//!
//! Database crates implement [`DocumentSource`] and [`RelationalSink`]; the
//! migrator is generic over both so tests can drive it with in-memory fakes.

use crate::batch::Batch;
use crate::catalog::TableMapping;
use crate::types::ColumnTypeInfo;
use crate::values::SourceDocument;
use thiserror::Error;

/// Errors raised by a document source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// The source is unreachable; no further table can be read
    #[error("Source connection failed: {0}")]
    Connection(String),

    /// Opening or advancing the cursor over a collection failed
    #[error("Failed to read collection '{collection}': {message}")]
    Read { collection: String, message: String },

    /// A document could not be decoded
    #[error("Failed to decode document from '{collection}': {message}")]
    Decode { collection: String, message: String },
}

impl SourceError {
    /// Fatal errors abort the whole run instead of only the current table.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Errors raised by a relational sink.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SinkError {
    /// The target connection is closed or could not be established
    #[error("Target connection failed: {0}")]
    Connection(String),

    /// The probe query for a table failed (missing table or column, permissions, ...)
    #[error("Failed to probe table '{table}': {message}")]
    Probe { table: String, message: String },

    /// The probe returned a different number of columns than the mapping lists
    #[error("Probe of table '{table}' returned {found} columns, expected {expected}")]
    ColumnCount {
        table: String,
        expected: usize,
        found: usize,
    },

    /// Executing or committing the batch failed; the transaction was rolled back
    #[error("Failed to write batch to '{table}': {message}")]
    Write { table: String, message: String },
}

impl SinkError {
    /// Fatal errors abort the whole run instead of only the current table.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// A store of schema-less documents grouped in named collections.
#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    type Cursor: DocumentCursor;

    /// Open a forward-only cursor over every document of a collection.
    ///
    /// A collection that does not exist yields an empty cursor.
    async fn open_cursor(&self, collection: &str) -> Result<Self::Cursor, SourceError>;
}

/// Forward-only iteration over the documents of one collection.
#[async_trait::async_trait]
pub trait DocumentCursor: Send {
    type Document: SourceDocument + Send;

    /// Next document, or `None` once the collection is exhausted.
    async fn next_document(&mut self) -> Result<Option<Self::Document>, SourceError>;
}

/// A relational database the documents are copied into.
///
/// Implementations hold a single connection and are driven one table at a
/// time, hence `&mut self`.
#[async_trait::async_trait]
pub trait RelationalSink: Send {
    /// Discover the type of every mapped column without reading rows.
    ///
    /// The returned list has one entry per mapped column, in mapping order.
    async fn probe_columns(
        &mut self,
        table: &TableMapping,
    ) -> Result<Vec<ColumnTypeInfo>, SinkError>;

    /// Insert every row of the batch inside one transaction.
    ///
    /// The transaction is committed even when the batch is empty. With
    /// `dry_run` the statements run but the transaction is rolled back.
    /// Returns the number of rows inserted.
    async fn write_batch(&mut self, batch: &Batch, dry_run: bool) -> Result<u64, SinkError>;
}
