//! Table-by-table migration loop.
//!
//! For each mapped table, in catalog order:
//!
//! 1. probe the target for the mapped columns' types,
//! 2. read every document of the matching collection and coerce it into one row,
//! 3. write all rows in one transaction.
//!
//! A failure while handling one table is recorded and the loop moves on. Only
//! errors that make every later table fail as well (lost connections) stop
//! the run early.

use serde::Serialize;
use sync_core::{
    coerce_row, Batch, CoercionError, ColumnTypeInfo, DocumentCursor, DocumentSource,
    RelationalSink, SchemaCatalog, SinkError, SourceError, TableMapping,
};

/// Options that change how each table is handled.
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrateOptions {
    /// Roll back every table's transaction instead of committing it.
    pub dry_run: bool,
    /// Fail a table whose probe reports a column type with no coercion rule.
    pub strict_types: bool,
}

/// What happened to one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableStatus {
    /// All rows were written (or, in a dry run, would have been)
    Migrated {
        rows: u64,
        /// Values re-bound as text after a numeric conversion failed
        fallbacks: usize,
    },
    Failed {
        error: String,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableOutcome {
    pub table: String,
    #[serde(flatten)]
    pub status: TableStatus,
    /// Column types reported by the probe; empty when the probe never ran
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnTypeInfo>,
}

/// Result of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationReport {
    /// One entry per attempted table, in the order they were attempted
    pub tables: Vec<TableOutcome>,
    /// Set when a fatal error stopped the run before every table was attempted
    pub aborted: Option<String>,
    pub dry_run: bool,
}

impl MigrationReport {
    pub fn migrated(&self) -> usize {
        self.count(|s| matches!(s, TableStatus::Migrated { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, TableStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, TableStatus::Skipped { .. }))
    }

    /// Rows written across all migrated tables.
    pub fn total_rows(&self) -> u64 {
        self.tables
            .iter()
            .map(|t| match t.status {
                TableStatus::Migrated { rows, .. } => rows,
                _ => 0,
            })
            .sum()
    }

    /// True when no table failed and the run was not aborted.
    pub fn is_success(&self) -> bool {
        self.aborted.is_none() && self.failed() == 0
    }

    pub fn outcome(&self, table: &str) -> Option<&TableStatus> {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .map(|t| &t.status)
    }

    fn count(&self, pred: impl Fn(&TableStatus) -> bool) -> usize {
        self.tables.iter().filter(|t| pred(&t.status)).count()
    }
}

/// Why a table did not migrate.
enum TableError {
    /// Every later table would fail too; stop the run
    Fatal(String),
    /// Only this table is affected
    Table(String),
}

impl From<SinkError> for TableError {
    fn from(e: SinkError) -> Self {
        if e.is_fatal() {
            TableError::Fatal(e.to_string())
        } else {
            TableError::Table(e.to_string())
        }
    }
}

impl From<SourceError> for TableError {
    fn from(e: SourceError) -> Self {
        if e.is_fatal() {
            TableError::Fatal(e.to_string())
        } else {
            TableError::Table(e.to_string())
        }
    }
}

impl From<CoercionError> for TableError {
    fn from(e: CoercionError) -> Self {
        TableError::Table(e.to_string())
    }
}

/// Drives a [`DocumentSource`] into a [`RelationalSink`], one table at a time.
pub struct Migrator<S, K> {
    source: S,
    sink: K,
    options: MigrateOptions,
}

impl<S, K> Migrator<S, K>
where
    S: DocumentSource,
    K: RelationalSink,
{
    pub fn new(source: S, sink: K, options: MigrateOptions) -> Self {
        Self {
            source,
            sink,
            options,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }

    /// Attempt every table of the catalog exactly once.
    pub async fn run(&mut self, catalog: &SchemaCatalog) -> MigrationReport {
        let mut report = MigrationReport {
            dry_run: self.options.dry_run,
            ..Default::default()
        };

        for table in catalog.tables() {
            tracing::info!("Migrating table: {}", table.name);

            let mut columns = Vec::new();
            let status = match self.migrate_table(table, &mut columns).await {
                Ok(status) => status,
                Err(TableError::Table(error)) => {
                    tracing::error!("Table {} migration failed: {}", table.name, error);
                    TableStatus::Failed { error }
                }
                Err(TableError::Fatal(error)) => {
                    tracing::error!(
                        "Aborting run while migrating table {}: {}",
                        table.name,
                        error
                    );
                    report.tables.push(TableOutcome {
                        table: table.name.clone(),
                        status: TableStatus::Failed {
                            error: error.clone(),
                        },
                        columns,
                    });
                    report.aborted = Some(error);
                    break;
                }
            };

            match &status {
                TableStatus::Migrated { rows, fallbacks } => {
                    if *fallbacks > 0 {
                        tracing::warn!(
                            "Table {}: {} numeric values were bound as text",
                            table.name,
                            fallbacks
                        );
                    }
                    tracing::info!("Table {}: {} rows written", table.name, rows);
                    println!("{}", completion_message(&table.name, self.options.dry_run));
                }
                TableStatus::Skipped { reason } => {
                    tracing::warn!("Skipping table {}: {}", table.name, reason);
                }
                TableStatus::Failed { .. } => {}
            }

            report.tables.push(TableOutcome {
                table: table.name.clone(),
                status,
                columns,
            });
        }

        tracing::info!(
            "Migration finished: {} migrated, {} failed, {} skipped, {} rows{}",
            report.migrated(),
            report.failed(),
            report.skipped(),
            report.total_rows(),
            if report.dry_run { " (dry run)" } else { "" }
        );

        report
    }

    async fn migrate_table(
        &mut self,
        table: &TableMapping,
        probed: &mut Vec<ColumnTypeInfo>,
    ) -> Result<TableStatus, TableError> {
        if !table.has_columns() {
            return Ok(TableStatus::Skipped {
                reason: "no columns mapped".to_string(),
            });
        }

        let columns = self.sink.probe_columns(table).await?;
        probed.clone_from(&columns);

        let unrecognized: Vec<String> = columns
            .iter()
            .filter(|c| !c.category.is_recognized())
            .map(|c| format!("{} ({})", c.name, c.native_type))
            .collect();
        if !unrecognized.is_empty() {
            if self.options.strict_types {
                return Err(TableError::Table(format!(
                    "columns with unsupported types: {}",
                    unrecognized.join(", ")
                )));
            }
            tracing::warn!(
                "Table {}: no conversion for columns {}; they will be written as NULL",
                table.name,
                unrecognized.join(", ")
            );
        }

        let mut cursor = self.source.open_cursor(table.collection()).await?;
        let mut batch = Batch::new(table);
        let mut fallbacks = 0;

        while let Some(doc) = cursor.next_document().await? {
            let row = coerce_row(&doc, &columns)?;
            fallbacks += row.fallbacks;
            batch.push(row.values).map_err(|values| {
                TableError::Table(format!(
                    "row has {} values for {} columns",
                    values.len(),
                    table.columns.len()
                ))
            })?;
            tracing::trace!("Table {}: coerced document {}", table.name, batch.len());
        }

        tracing::debug!(
            "Table {}: writing {} rows from collection {}",
            table.name,
            batch.len(),
            table.collection()
        );
        let rows = self.sink.write_batch(&batch, self.options.dry_run).await?;

        Ok(TableStatus::Migrated { rows, fallbacks })
    }
}

/// Line printed to stdout for each migrated table.
fn completion_message(table: &str, dry_run: bool) -> String {
    if dry_run {
        format!("Table {table} dry run completed; transaction rolled back")
    } else {
        format!("Table {table} migration completed successfully!")
    }
}
