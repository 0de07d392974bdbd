//! mongo-sql-sync library
//!
//! Copies MongoDB collections into PostgreSQL tables. A mapping file names,
//! per table, the ordered columns to fill; each table's column types are
//! probed from PostgreSQL and every document field is coerced to fit.
//!
//! # Crates
//!
//! - `sync_core` - catalog, value model, coercion rules, source/sink traits
//! - `mongodb_source` - MongoDB [`DocumentSource`](sync_core::DocumentSource)
//! - `postgresql_sink` - PostgreSQL [`RelationalSink`](sync_core::RelationalSink)
//!
//! # CLI Usage
//!
//! ```bash
//! mongo-sql-sync \
//!   --mapping-file migration.info \
//!   --source-uri mongodb://localhost:27017 --source-database app \
//!   --target-connection-string "host=localhost user=postgres dbname=app"
//! ```

use clap::Parser;

pub mod migrate;
mod sync;

pub use migrate::{MigrateOptions, MigrationReport, Migrator, TableOutcome, TableStatus};
pub use sync::{load_catalog, run_mongodb_to_postgresql, write_report};

#[derive(Parser, Clone, Debug)]
pub struct SourceOpts {
    /// MongoDB connection URI
    #[arg(long, default_value = "mongodb://127.0.0.1:27017", env = "MONGODB_URI")]
    pub source_uri: String,

    /// MongoDB database holding the collections
    #[arg(long, env = "MONGODB_DATABASE")]
    pub source_database: Option<String>,
}

// CLI type → MongoDB source library type
impl From<&SourceOpts> for mongodb_source::SourceOpts {
    fn from(opts: &SourceOpts) -> Self {
        Self {
            source_uri: opts.source_uri.clone(),
            source_database: opts.source_database.clone(),
        }
    }
}

#[derive(Parser, Clone, Debug)]
pub struct TargetOpts {
    /// PostgreSQL connection string (key=value or postgresql:// URL)
    #[arg(long, env = "POSTGRES_CONNECTION_STRING")]
    pub target_connection_string: String,
}

#[derive(Parser, Clone, Debug)]
pub struct SyncOpts {
    /// Maximum rows per INSERT statement
    #[arg(long, default_value = "1000")]
    pub batch_size: usize,

    /// Dry run mode - write inside each table's transaction, then roll back
    #[arg(long)]
    pub dry_run: bool,

    /// Only migrate these tables (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub tables: Vec<String>,

    /// Fail a table when a mapped column has a type with no conversion rule
    #[arg(long)]
    pub strict_types: bool,
}

impl From<&SyncOpts> for MigrateOptions {
    fn from(opts: &SyncOpts) -> Self {
        Self {
            dry_run: opts.dry_run,
            strict_types: opts.strict_types,
        }
    }
}
