use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// SQL flavor of the target database.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    #[default]
    GoogleStandardSql,
    Postgresql,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::GoogleStandardSql => "google_standard_sql",
            Dialect::Postgresql => "postgresql",
        }
    }

    pub fn is_postgres(&self) -> bool {
        matches!(self, Dialect::Postgresql)
    }

    /// Quote an identifier the way this dialect expects.
    pub fn quote(&self, ident: &str) -> String {
        match self {
            Dialect::GoogleStandardSql => format!("`{ident}`"),
            Dialect::Postgresql => format!("\"{ident}\""),
        }
    }

    /// Schema name that holds user tables in `INFORMATION_SCHEMA.TABLES`.
    pub fn user_table_schema(&self) -> &'static str {
        match self {
            Dialect::GoogleStandardSql => "",
            Dialect::Postgresql => "public",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "google_standard_sql" | "googlesql" | "google-standard-sql" => {
                Ok(Dialect::GoogleStandardSql)
            }
            "postgresql" | "postgres" | "pg" => Ok(Dialect::Postgresql),
            other => Err(Error::UnknownDialect(other.to_string())),
        }
    }
}

/// How data is moved after the schema is in place.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MigrationType {
    /// One-shot bulk load; foreign keys are backfilled afterwards.
    #[default]
    Bulk,
    /// Minimal downtime streaming migration.
    Dataflow,
}

impl MigrationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationType::Bulk => "bulk",
            MigrationType::Dataflow => "dataflow",
        }
    }

    /// Whether foreign keys are sent inline with the create-database request.
    ///
    /// Only the default dialect accepts inline DDL, and only streaming
    /// migrations want constraints in place before data arrives.
    pub fn inlines_foreign_keys(&self, dialect: Dialect) -> bool {
        !dialect.is_postgres() && matches!(self, MigrationType::Dataflow)
    }
}

impl fmt::Display for MigrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "bulk" => Ok(MigrationType::Bulk),
            "dataflow" => Ok(MigrationType::Dataflow),
            other => Err(Error::UnknownMigrationType(other.to_string())),
        }
    }
}
