//! Table and column metadata.

use serde::{Deserialize, Serialize};

/// A scalar column type, as seen by the compiler and dialect layer. Only
/// the distinctions the query pipeline actually branches on are modeled;
/// everything else collapses to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Id,
    Int,
    Float,
    Text,
    Boolean,
    Json,
    Array,
    Timestamp,
    Other,
}

/// One column of a table, as discovered by schema introspection (out of
/// scope here) and handed to the compiler as data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub col_type: ColumnType,
    pub nullable: bool,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
}

/// A queryable table or view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    /// Database this table lives in, for multi-database routing.
    pub database: String,
    pub columns: Vec<Column>,
    /// Table-level comment directives the schema loader extracted, e.g.
    /// `@primary_key`, surfaced for the compiler without re-parsing DDL.
    pub primary_key: Vec<String>,
}

impl Table {
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }
}
