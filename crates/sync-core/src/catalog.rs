//! Table catalog: which collections are copied into which tables, and in
//! which column order.
//!
//! The catalog is loaded from a plain text mapping file with one table per
//! line:
//!
//! ```text
//! # table,column,column,...
//! orders,id,name,created_at
//! customers, id , email
//! ```
//!
//! Blank lines and lines whose first character is `#` are ignored. The first token is the
//! table (and source collection) name, the remaining tokens are the target
//! columns in insert order. Tokens are trimmed; nothing else is validated.

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a mapping file.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Error reading the mapping file
    #[error("Failed to read mapping file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A table appeared twice while duplicates are rejected
    #[error("Table '{table}' is mapped more than once (line {line})")]
    DuplicateTable { table: String, line: usize },
}

/// One mapped table: the table name and its ordered column list.
///
/// The column order is authoritative. The schema probe and the value coercer
/// both iterate this same list, so probed column types line up with the
/// coerced parameters by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMapping {
    pub name: String,
    pub columns: Vec<String>,
}

impl TableMapping {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Name of the source collection the table is copied from.
    pub fn collection(&self) -> &str {
        &self.name
    }

    pub fn has_columns(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Parse one mapping line. Returns `None` for blank and comment lines.
    ///
    /// Only a `#` in the first column marks a comment; `  #x,a` is a table.
    pub fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || line.starts_with('#') {
            return None;
        }

        let mut tokens: Vec<String> = trimmed.split(',').map(|t| t.trim().to_string()).collect();
        // "orders," maps to no columns rather than to a column named ""
        while tokens.len() > 1 && tokens.last().is_some_and(|t| t.is_empty()) {
            tokens.pop();
        }

        let name = tokens.remove(0);
        Some(Self::new(name, tokens))
    }
}

/// Loader options for [`SchemaCatalog`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogOptions {
    /// Fail instead of letting a later line replace an earlier one for the same table.
    pub reject_duplicates: bool,
}

/// Table name → ordered column list, in first-appearance order.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    tables: Vec<TableMapping>,
    index: HashMap<String, usize>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse mapping text with default options (duplicates: last one wins).
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        Self::parse_with_options(text, CatalogOptions::default())
    }

    pub fn parse_with_options(text: &str, options: CatalogOptions) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for (idx, line) in text.lines().enumerate() {
            let Some(mapping) = TableMapping::parse_line(line) else {
                continue;
            };
            if catalog.get(&mapping.name).is_some() {
                if options.reject_duplicates {
                    return Err(CatalogError::DuplicateTable {
                        table: mapping.name,
                        line: idx + 1,
                    });
                }
                tracing::warn!(
                    "Table '{}' is mapped again on line {}; the later column list replaces the earlier one",
                    mapping.name,
                    idx + 1
                );
            }
            catalog.insert(mapping);
        }
        Ok(catalog)
    }

    /// Load a mapping file from disk.
    pub fn from_file(path: &Path, options: CatalogOptions) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::parse_with_options(&text, options)?;
        for table in catalog.tables() {
            tracing::info!("Table: {}, Fields: {:?}", table.name, table.columns);
        }
        Ok(catalog)
    }

    /// Insert a mapping. An existing table keeps its position but takes the new columns.
    pub fn insert(&mut self, mapping: TableMapping) {
        match self.index.get(&mapping.name) {
            Some(&idx) => self.tables[idx] = mapping,
            None => {
                self.index.insert(mapping.name.clone(), self.tables.len());
                self.tables.push(mapping);
            }
        }
    }

    pub fn get(&self, table: &str) -> Option<&TableMapping> {
        self.index.get(table).map(|&idx| &self.tables[idx])
    }

    pub fn tables(&self) -> &[TableMapping] {
        &self.tables
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Keep only the named tables. Returns the requested names that are not in the catalog.
    pub fn retain_tables(&mut self, names: &[String]) -> Vec<String> {
        let missing = names
            .iter()
            .filter(|n| self.get(n).is_none())
            .cloned()
            .collect();
        self.tables.retain(|t| names.contains(&t.name));
        self.index = self
            .tables
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.name.clone(), idx))
            .collect();
        missing
    }
}
