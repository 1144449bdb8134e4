//! Schema model: the authoritative list of tables and columns.
//!
//! A [`Schema`] is built once from a schema document (or DDL) and is
//! read-only afterwards. Construction derives a lowercase index so that
//! table and column existence checks are case-insensitive hash lookups.
//!
//! # Document format
//!
//! ```json
//! {
//!   "tables": [
//!     {
//!       "table_name": "users",
//!       "description": "Employees and contractors",
//!       "columns": { "user_id": "Primary key", "name": "Full name" }
//!     }
//!   ]
//! }
//! ```
//!
//! Column order in the document is preserved and used when listing the valid
//! alternatives in a diagnostic.

mod ddl;
mod store;

pub use store::SchemaStore;

use crate::error::SchemaLoadError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// A table described by the schema document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    #[serde(rename = "table_name", alias = "name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Column name to description, in document order
    #[serde(default)]
    pub columns: IndexMap<String, String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            columns: IndexMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_column(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.columns.insert(name.into(), description.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    tables: Vec<Table>,
}

#[derive(Debug, Clone)]
struct TableEntry {
    position: usize,
    columns: HashSet<String>,
}

/// Immutable schema with a derived lowercase lookup index.
///
/// `Schema` is `Send + Sync` and never mutated after construction, so it can
/// be shared by reference (or behind an `Arc`) across concurrent validations.
#[derive(Debug, Clone)]
pub struct Schema {
    tables: Vec<Table>,
    index: HashMap<String, TableEntry>,
}

impl Schema {
    /// Build a schema from tables, rejecting empty and duplicate table names.
    ///
    /// Duplicate detection is case-insensitive, matching lookups.
    pub fn from_tables(mut tables: Vec<Table>) -> Result<Self, SchemaLoadError> {
        let mut index = HashMap::with_capacity(tables.len());

        for (position, table) in tables.iter_mut().enumerate() {
            let trimmed = table.name.trim();
            if trimmed.len() != table.name.len() {
                table.name = trimmed.to_string();
            }
            let key = table.name.to_lowercase();
            if key.is_empty() {
                return Err(SchemaLoadError::EmptyTableName { index: position });
            }

            let columns = table.columns.keys().map(|c| c.to_lowercase()).collect();
            if index
                .insert(key, TableEntry { position, columns })
                .is_some()
            {
                return Err(SchemaLoadError::DuplicateTable {
                    name: table.name.clone(),
                });
            }
        }

        Ok(Self { tables, index })
    }

    /// Parse a JSON schema document.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaLoadError> {
        let document: SchemaDocument = serde_json::from_str(json)?;
        Self::from_tables(document.tables)
    }

    /// Read and parse a JSON schema document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaLoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SchemaLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Tables in document order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Case-insensitive table lookup.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.entry(name).map(|entry| &self.tables[entry.position])
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Returns `false` when the table itself is unknown.
    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.entry(table)
            .is_some_and(|entry| entry.columns.contains(&column.to_lowercase()))
    }

    /// Column names of `table` in document order; empty for an unknown table.
    pub fn available_columns(&self, table: &str) -> Vec<String> {
        self.table(table)
            .map(|t| t.columns.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// All table names, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().map(|t| t.name.clone()).collect();
        names.sort();
        names
    }

    fn entry(&self, name: &str) -> Option<&TableEntry> {
        self.index.get(&name.trim().to_lowercase())
    }
}
