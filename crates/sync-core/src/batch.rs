//! Accumulated rows for one table.

use crate::catalog::TableMapping;
use crate::coerce::CoercedValue;

/// Coerced rows waiting to be written to one table in a single transaction.
///
/// Every row has exactly one value per mapped column, in mapping order.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CoercedValue>>,
}

impl Batch {
    pub fn new(mapping: &TableMapping) -> Self {
        Self {
            table: mapping.name.clone(),
            columns: mapping.columns.clone(),
            rows: Vec::new(),
        }
    }

    /// Append one row. Rows whose arity does not match the column list are
    /// rejected and returned to the caller.
    pub fn push(&mut self, row: Vec<CoercedValue>) -> Result<(), Vec<CoercedValue>> {
        if row.len() != self.columns.len() {
            return Err(row);
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
