//! PostgreSQL relational sink for mongo-sql-sync.
//!
//! - [`sql`] - identifier quoting and statement text
//! - [`PostgreSQLSink`] - schema probe and transactional batch writes

pub mod sql;
mod sink;

pub use sink::{connect, PostgreSQLSink, DEFAULT_BATCH_SIZE};
