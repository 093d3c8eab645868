use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constraints::{ForeignKey, Interleave};
use crate::dialect::Dialect;
use crate::types::{ColumnType, Sequence};

/// Logical schema to apply to a target database.
///
/// Produced by an upstream conversion stage; this workspace only reads it to
/// derive DDL text and table names.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SchemaModel {
    /// Contract version for this schema format.
    pub schema_version: String,
    /// Dialect of the target database.
    pub dialect: Dialect,
    /// Label of the source driver the schema was converted from (e.g. `mysql`).
    pub source: String,
    /// Tables keyed by table id.
    pub tables: BTreeMap<String, Table>,
    /// Sequences keyed by sequence id.
    #[serde(default)]
    pub sequences: BTreeMap<String, Sequence>,
}

impl SchemaModel {
    /// Empty schema for the given dialect and source label.
    pub fn new(dialect: Dialect, source: impl Into<String>) -> Self {
        Self {
            schema_version: crate::SCHEMA_VERSION.to_string(),
            dialect,
            source: source.into(),
            tables: BTreeMap::new(),
            sequences: BTreeMap::new(),
        }
    }

    /// Insert a table under its own id.
    pub fn insert_table(&mut self, table: Table) {
        self.tables.insert(table.id.clone(), table);
    }

    /// Table names in id order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.values().map(|table| table.name.as_str()).collect()
    }

    /// Total number of foreign keys across all tables.
    pub fn foreign_key_count(&self) -> usize {
        self.tables
            .values()
            .map(|table| table.foreign_keys.len())
            .sum()
    }
}

/// A table to create in the target database.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub columns: Vec<Column>,
    /// Primary key column names in key order.
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    pub interleave: Option<Interleave>,
}

impl Table {
    /// Table whose id equals its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            comment: None,
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            interleave: None,
        }
    }
}

/// Column definition.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            not_null: false,
            comment: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }
}
