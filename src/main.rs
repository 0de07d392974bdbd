//! Command-line interface for mongo-sql-sync
//!
//! # Usage Examples
//!
//! ```bash
//! # Migrate every table listed in migration.info
//! mongo-sql-sync \
//!   --mapping-file migration.info \
//!   --source-uri mongodb://localhost:27017 \
//!   --source-database app \
//!   --target-connection-string "host=localhost user=postgres password=postgres dbname=app"
//!
//! # Check two tables without committing anything
//! mongo-sql-sync --tables orders,customers --dry-run ...
//! ```
//!
//! ## Mapping File
//! One table per line, `table,column,column,...`. Blank lines and lines
//! starting with `#` are ignored.

use clap::Parser;
use mongo_sql_sync::{
    load_catalog, run_mongodb_to_postgresql, write_report, SourceOpts, SyncOpts, TargetOpts,
};
use std::path::PathBuf;
use sync_core::CatalogOptions;

#[derive(Parser)]
#[command(name = "mongo-sql-sync")]
#[command(about = "Copy MongoDB collections into PostgreSQL tables described by a mapping file")]
#[command(version)]
struct Cli {
    /// Mapping file: one `table,column,...` line per table
    #[arg(long, default_value = "migration.info", env = "MONGO_SQL_SYNC_MAPPING")]
    mapping_file: PathBuf,

    /// Fail when a table appears more than once in the mapping file
    #[arg(long)]
    reject_duplicate_tables: bool,

    /// Write a JSON report of every table's outcome to this path
    #[arg(long)]
    emit_report: Option<PathBuf>,

    #[command(flatten)]
    source: SourceOpts,

    #[command(flatten)]
    target: TargetOpts,

    #[command(flatten)]
    sync: SyncOpts,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let catalog = load_catalog(
        &cli.mapping_file,
        CatalogOptions {
            reject_duplicates: cli.reject_duplicate_tables,
        },
        &cli.sync.tables,
    )?;

    let report = run_mongodb_to_postgresql(&catalog, &cli.source, &cli.target, &cli.sync).await?;

    if let Some(path) = &cli.emit_report {
        write_report(&report, path)?;
    }

    if let Some(reason) = &report.aborted {
        anyhow::bail!("Migration aborted: {reason}");
    }
    if report.failed() > 0 {
        anyhow::bail!(
            "{} of {} tables failed to migrate",
            report.failed(),
            report.tables.len()
        );
    }
    Ok(())
}
