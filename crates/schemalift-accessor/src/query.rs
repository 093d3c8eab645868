use std::collections::BTreeMap;

use async_trait::async_trait;
use schemalift_core::DatabaseUri;
use serde_json::Value;
use thiserror::Error;

/// Failure reported by the data-plane client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("query failed: {0}")]
    Failed(String),
    #[error("can't scan column {index}: {reason}")]
    Scan { index: usize, reason: String },
}

/// SQL text with named parameters (`@p1`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: BTreeMap<String, Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

/// One result row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Read column `index` as a string.
    pub fn string(&self, index: usize) -> Result<String, QueryError> {
        match self.values.get(index) {
            Some(Value::String(value)) => Ok(value.clone()),
            Some(other) => Err(QueryError::Scan {
                index,
                reason: format!("expected string, found {other}"),
            }),
            None => Err(QueryError::Scan {
                index,
                reason: "column out of range".to_string(),
            }),
        }
    }
}

/// Iterator over query results. `Ok(None)` marks the end of rows.
#[async_trait]
pub trait RowStream: Send {
    async fn next(&mut self) -> Result<Option<Row>, QueryError>;
}

/// Data-plane client running read-only queries.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Run `statement` in a single-use read-only transaction.
    async fn single_query(
        &self,
        database: &DatabaseUri,
        statement: Statement,
    ) -> Result<Box<dyn RowStream>, QueryError>;
}
