//! [`RelationalSink`] implementation for PostgreSQL.

use crate::sql::{insert_sql, probe_sql, rows_per_statement};
use postgresql_types::{postgresql_type_to_category, row_to_postgresql, PostgreSQLValue};
use sync_core::{Batch, ColumnTypeInfo, RelationalSink, SinkError, TableMapping};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Statement};

/// Default number of rows per INSERT statement.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Connect to PostgreSQL and verify the connection.
///
/// # Example
///
/// ```ignore
/// let client = postgresql_sink::connect(
///     "host=localhost user=postgres password=postgres dbname=testdb",
/// ).await?;
/// ```
pub async fn connect(connection_string: &str) -> Result<Client, SinkError> {
    let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
        .await
        .map_err(|e| SinkError::Connection(e.to_string()))?;

    // Spawn the connection task
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {}", e);
        }
    });

    // Test connection
    client
        .simple_query("SELECT 1")
        .await
        .map_err(|e| SinkError::Connection(e.to_string()))?;
    tracing::info!("Connected to PostgreSQL");

    Ok(client)
}

/// A closed connection is fatal; any server-side error only fails the table.
fn is_connection_lost(e: &tokio_postgres::Error) -> bool {
    e.is_closed()
}

fn probe_error(table: &str, e: tokio_postgres::Error) -> SinkError {
    if is_connection_lost(&e) {
        return SinkError::Connection(e.to_string());
    }
    SinkError::Probe {
        table: table.to_string(),
        message: describe(&e),
    }
}

fn write_error(table: &str, e: tokio_postgres::Error) -> SinkError {
    if is_connection_lost(&e) {
        return SinkError::Connection(e.to_string());
    }
    SinkError::Write {
        table: table.to_string(),
        message: describe(&e),
    }
}

/// Server errors carry their message in the `DbError`; the top-level
/// `Display` only says "db error".
fn describe(e: &tokio_postgres::Error) -> String {
    match e.as_db_error() {
        Some(db) => format!("{}: {}", db.code().code(), db.message()),
        None => e.to_string(),
    }
}

/// PostgreSQL sink holding a single client connection.
pub struct PostgreSQLSink {
    client: Client,
    batch_size: usize,
}

impl PostgreSQLSink {
    pub fn new(client: Client, batch_size: usize) -> Self {
        Self {
            client,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[async_trait::async_trait]
impl RelationalSink for PostgreSQLSink {
    async fn probe_columns(
        &mut self,
        table: &TableMapping,
    ) -> Result<Vec<ColumnTypeInfo>, SinkError> {
        let sql = probe_sql(&table.name, &table.columns);
        tracing::debug!("Probe SQL: {}", sql);

        let statement = self
            .client
            .prepare(&sql)
            .await
            .map_err(|e| probe_error(&table.name, e))?;

        let reported = statement.columns();
        if reported.len() != table.columns.len() {
            return Err(SinkError::ColumnCount {
                table: table.name.clone(),
                expected: table.columns.len(),
                found: reported.len(),
            });
        }

        // Names come from the mapping, types from the statement metadata
        let columns: Vec<ColumnTypeInfo> = table
            .columns
            .iter()
            .zip(reported)
            .enumerate()
            .map(|(idx, (name, column))| {
                ColumnTypeInfo::new(
                    idx + 1,
                    name.clone(),
                    column.type_().name(),
                    postgresql_type_to_category(column.type_()),
                )
            })
            .collect();

        for column in &columns {
            tracing::debug!(
                "Column {} '{}' of '{}': {} ({})",
                column.position,
                column.name,
                table.name,
                column.native_type,
                column.category
            );
        }

        Ok(columns)
    }

    async fn write_batch(&mut self, batch: &Batch, dry_run: bool) -> Result<u64, SinkError> {
        if batch.columns.is_empty() {
            return Err(SinkError::Write {
                table: batch.table.clone(),
                message: "no columns mapped".to_string(),
            });
        }

        let chunk_rows = rows_per_statement(self.batch_size, batch.columns.len());
        let tx = self
            .client
            .transaction()
            .await
            .map_err(|e| write_error(&batch.table, e))?;

        let mut inserted = 0u64;
        let mut full_statement: Option<Statement> = None;

        for chunk in batch.rows.chunks(chunk_rows) {
            // Full-size chunks share one prepared statement
            let statement = match &full_statement {
                Some(stmt) if chunk.len() == chunk_rows => stmt.clone(),
                _ => {
                    let sql = insert_sql(&batch.table, &batch.columns, chunk.len());
                    tracing::debug!("Insert SQL: {}", sql);
                    let stmt = tx
                        .prepare(&sql)
                        .await
                        .map_err(|e| write_error(&batch.table, e))?;
                    if chunk.len() == chunk_rows {
                        full_statement = Some(stmt.clone());
                    }
                    stmt
                }
            };

            let values: Vec<PostgreSQLValue> =
                chunk.iter().flat_map(|row| row_to_postgresql(row)).collect();
            let params: Vec<&(dyn ToSql + Sync)> =
                values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();

            inserted += tx
                .execute(&statement, &params)
                .await
                .map_err(|e| write_error(&batch.table, e))?;
        }

        if dry_run {
            tx.rollback()
                .await
                .map_err(|e| write_error(&batch.table, e))?;
            tracing::info!(
                "Dry run: rolled back {} rows for table '{}'",
                inserted,
                batch.table
            );
        } else {
            tx.commit()
                .await
                .map_err(|e| write_error(&batch.table, e))?;
        }

        Ok(inserted)
    }
}
