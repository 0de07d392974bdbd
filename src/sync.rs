//! Wiring for a MongoDB → PostgreSQL run.

use crate::migrate::{MigrateOptions, MigrationReport, Migrator};
use crate::{SourceOpts, SyncOpts, TargetOpts};
use anyhow::Context;
use postgresql_sink::PostgreSQLSink;
use std::path::Path;
use sync_core::{CatalogOptions, SchemaCatalog};

/// Load the mapping file and apply the `--tables` filter.
pub fn load_catalog(
    path: &Path,
    options: CatalogOptions,
    tables: &[String],
) -> anyhow::Result<SchemaCatalog> {
    let mut catalog = SchemaCatalog::from_file(path, options)
        .with_context(|| format!("Failed to load mapping file {path:?}"))?;

    if !tables.is_empty() {
        let missing = catalog.retain_tables(tables);
        for name in missing {
            tracing::warn!("Table '{}' is not in the mapping file", name);
        }
    }

    if catalog.is_empty() {
        tracing::warn!("No tables to migrate");
    }
    Ok(catalog)
}

/// Connect to both databases and migrate every table of the catalog.
///
/// Connection failures are returned as errors before any table is attempted.
/// Per-table failures are recorded in the report.
pub async fn run_mongodb_to_postgresql(
    catalog: &SchemaCatalog,
    source_opts: &SourceOpts,
    target_opts: &TargetOpts,
    sync_opts: &SyncOpts,
) -> anyhow::Result<MigrationReport> {
    tracing::info!("Starting migration of {} tables", catalog.len());
    if sync_opts.dry_run {
        tracing::info!("Running in dry-run mode - transactions will be rolled back");
    }

    let mongo_opts = mongodb_source::SourceOpts::from(source_opts);
    let source = mongodb_source::connect(&mongo_opts)
        .await
        .context("Failed to connect to MongoDB")?;

    let client = postgresql_sink::connect(&target_opts.target_connection_string)
        .await
        .context("Failed to connect to PostgreSQL")?;
    let sink = PostgreSQLSink::new(client, sync_opts.batch_size);

    let mut migrator = Migrator::new(source, sink, MigrateOptions::from(sync_opts));
    Ok(migrator.run(catalog).await)
}

/// Write the report as pretty-printed JSON.
pub fn write_report(report: &MigrationReport, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file {path:?}"))?;
    serde_json::to_writer_pretty(file, report)
        .with_context(|| format!("Failed to write report to {path:?}"))?;
    tracing::info!("Wrote migration report to {:?}", path);
    Ok(())
}
