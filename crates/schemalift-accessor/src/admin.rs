use std::fmt;

use async_trait::async_trait;
use schemalift_core::{DatabaseUri, Dialect};

/// Closed classification of control-plane failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    NotFound,
    AlreadyExists,
    PermissionDenied,
    Unknown,
}

impl ErrorClass {
    /// Classify from error text alone.
    ///
    /// Fragile: the backend does not promise stable messages. Clients that
    /// receive status codes should set [`AdminError::class`] instead.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("database not found") {
            ErrorClass::NotFound
        } else if lower.contains("already exists") {
            ErrorClass::AlreadyExists
        } else if lower.contains("permission denied") {
            ErrorClass::PermissionDenied
        } else {
            ErrorClass::Unknown
        }
    }
}

/// Error returned by an admin collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminError {
    /// Structured class reported by the transport, when it has one.
    pub class: Option<ErrorClass>,
    pub message: String,
}

impl AdminError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            class: None,
            message: message.into(),
        }
    }

    pub fn with_class(class: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            class: Some(class),
            message: message.into(),
        }
    }

    /// Structured class when present, otherwise the message fallback.
    pub fn class(&self) -> ErrorClass {
        self.class
            .unwrap_or_else(|| ErrorClass::from_message(&self.message))
    }
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AdminError {}

pub type AdminResult<T> = std::result::Result<T, AdminError>;

/// Metadata returned for an existing database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInfo {
    pub name: DatabaseUri,
    pub dialect: Dialect,
}

/// Request to create a database, optionally with schema statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDatabaseRequest {
    /// `projects/{p}/instances/{i}`.
    pub parent: String,
    pub create_statement: String,
    pub dialect: Dialect,
    pub extra_statements: Vec<String>,
}

/// Request to apply a batch of DDL statements to an existing database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDdlRequest {
    pub database: DatabaseUri,
    pub statements: Vec<String>,
}

/// Handle to a long-running administrative operation.
#[async_trait]
pub trait Operation: Send {
    /// Block until the operation finishes, returning its terminal error.
    async fn wait(self: Box<Self>) -> AdminResult<()>;
}

/// Control-plane client that manages databases.
#[async_trait]
pub trait AdminClient: Send + Sync {
    async fn get_database(&self, database: &DatabaseUri) -> AdminResult<DatabaseInfo>;

    async fn create_database(
        &self,
        request: CreateDatabaseRequest,
    ) -> AdminResult<Box<dyn Operation>>;

    async fn update_database_ddl(
        &self,
        request: UpdateDdlRequest,
    ) -> AdminResult<Box<dyn Operation>>;

    async fn drop_database(&self, database: &DatabaseUri) -> AdminResult<()>;

    /// Classify an error produced by this client.
    fn classify(&self, err: &AdminError) -> ErrorClass {
        err.class()
    }
}
