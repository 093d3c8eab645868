use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fully qualified name of a target database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatabaseUri {
    pub project: String,
    pub instance: String,
    pub database: String,
}

impl DatabaseUri {
    pub fn new(
        project: impl Into<String>,
        instance: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            instance: instance.into(),
            database: database.into(),
        }
    }

    /// Parse `projects/{p}/instances/{i}/databases/{d}`.
    pub fn parse(uri: &str) -> Result<Self> {
        let parts: Vec<&str> = uri.trim().trim_end_matches('/').split('/').collect();
        match parts.as_slice() {
            ["projects", project, "instances", instance, "databases", database]
                if !project.is_empty() && !instance.is_empty() && !database.is_empty() =>
            {
                Ok(Self::new(*project, *instance, *database))
            }
            _ => Err(Error::InvalidUri(uri.to_string())),
        }
    }

    /// `projects/{p}/instances/{i}`, the parent of the database.
    pub fn instance_uri(&self) -> String {
        format!("projects/{}/instances/{}", self.project, self.instance)
    }
}

impl fmt::Display for DatabaseUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}

impl FromStr for DatabaseUri {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<String> for DatabaseUri {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<DatabaseUri> for String {
    fn from(uri: DatabaseUri) -> Self {
        uri.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_uri() {
        let uri = DatabaseUri::parse("projects/p1/instances/i1/databases/orders").unwrap();
        assert_eq!(uri.project, "p1");
        assert_eq!(uri.instance, "i1");
        assert_eq!(uri.database, "orders");
        assert_eq!(uri.instance_uri(), "projects/p1/instances/i1");
        assert_eq!(uri.to_string(), "projects/p1/instances/i1/databases/orders");
    }

    #[test]
    fn rejects_partial_uri() {
        assert!(DatabaseUri::parse("projects/p1/instances/i1").is_err());
        assert!(DatabaseUri::parse("projects//instances/i1/databases/d").is_err());
        assert!(DatabaseUri::parse("orders").is_err());
    }
}
