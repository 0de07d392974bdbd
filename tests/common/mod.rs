//! In-memory source and sink used to drive the migrator without databases.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use sync_core::{
    Batch, CoercedValue, ColumnTypeInfo, DocumentCursor, DocumentRow, DocumentSource,
    RelationalSink, SinkError, SourceError, SqlTypeCategory, TableMapping,
};

#[derive(Default)]
pub struct FakeSource {
    collections: HashMap<String, Vec<DocumentRow>>,
    failing: HashSet<String>,
    unreachable: bool,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, name: &str, docs: Vec<DocumentRow>) -> Self {
        self.collections.insert(name.to_string(), docs);
        self
    }

    /// Opening this collection fails with a non-fatal read error.
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Every cursor fails with a connection error.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }
}

pub struct FakeCursor {
    docs: VecDeque<DocumentRow>,
}

#[async_trait::async_trait]
impl DocumentSource for FakeSource {
    type Cursor = FakeCursor;

    async fn open_cursor(&self, collection: &str) -> Result<Self::Cursor, SourceError> {
        if self.unreachable {
            return Err(SourceError::Connection("server selection timeout".to_string()));
        }
        if self.failing.contains(collection) {
            return Err(SourceError::Read {
                collection: collection.to_string(),
                message: "cursor killed".to_string(),
            });
        }
        // Missing collections read as empty
        let docs = self.collections.get(collection).cloned().unwrap_or_default();
        Ok(FakeCursor { docs: docs.into() })
    }
}

#[async_trait::async_trait]
impl DocumentCursor for FakeCursor {
    type Document = DocumentRow;

    async fn next_document(&mut self) -> Result<Option<Self::Document>, SourceError> {
        Ok(self.docs.pop_front())
    }
}

/// What the fake sink saw, shared so tests can inspect it after the run.
#[derive(Debug, Default)]
pub struct SinkLog {
    pub probed: Vec<String>,
    pub committed: HashMap<String, Vec<Vec<CoercedValue>>>,
    pub rolled_back: HashMap<String, Vec<Vec<CoercedValue>>>,
}

/// Sink with declared column types per table.
#[derive(Default)]
pub struct FakeSink {
    tables: HashMap<String, HashMap<String, SqlTypeCategory>>,
    failing_writes: HashSet<String>,
    closed_on: Option<String>,
    log: Arc<Mutex<SinkLog>>,
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, columns: &[(&str, SqlTypeCategory)]) -> Self {
        self.tables.insert(
            name.to_string(),
            columns
                .iter()
                .map(|(c, t)| (c.to_string(), t.clone()))
                .collect(),
        );
        self
    }

    /// Writes to this table fail as a constraint violation would.
    pub fn failing_writes(mut self, table: &str) -> Self {
        self.failing_writes.insert(table.to_string());
        self
    }

    /// The connection closes when this table is probed.
    pub fn closed_on(mut self, table: &str) -> Self {
        self.closed_on = Some(table.to_string());
        self
    }

    pub fn log(&self) -> Arc<Mutex<SinkLog>> {
        Arc::clone(&self.log)
    }
}

#[async_trait::async_trait]
impl RelationalSink for FakeSink {
    async fn probe_columns(
        &mut self,
        table: &TableMapping,
    ) -> Result<Vec<ColumnTypeInfo>, SinkError> {
        self.log.lock().unwrap().probed.push(table.name.clone());

        if self.closed_on.as_deref() == Some(table.name.as_str()) {
            return Err(SinkError::Connection("connection closed".to_string()));
        }
        let Some(declared) = self.tables.get(&table.name) else {
            return Err(SinkError::Probe {
                table: table.name.clone(),
                message: format!("relation \"{}\" does not exist", table.name),
            });
        };

        table
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| match declared.get(name) {
                Some(category) => Ok(ColumnTypeInfo::new(
                    idx + 1,
                    name.clone(),
                    category.to_string(),
                    category.clone(),
                )),
                None => Err(SinkError::Probe {
                    table: table.name.clone(),
                    message: format!("column \"{name}\" does not exist"),
                }),
            })
            .collect()
    }

    async fn write_batch(&mut self, batch: &Batch, dry_run: bool) -> Result<u64, SinkError> {
        if self.failing_writes.contains(&batch.table) {
            return Err(SinkError::Write {
                table: batch.table.clone(),
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }

        let mut log = self.log.lock().unwrap();
        let target = if dry_run {
            &mut log.rolled_back
        } else {
            &mut log.committed
        };
        target.insert(batch.table.clone(), batch.rows.clone());
        Ok(batch.rows.len() as u64)
    }
}
