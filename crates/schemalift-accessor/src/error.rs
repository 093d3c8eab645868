use std::time::Duration;

use schemalift_core::Dialect;
use thiserror::Error;

use crate::admin::{AdminClient, AdminError, ErrorClass};
use crate::query::QueryError;

/// Errors returned by accessor operations.
#[derive(Debug, Error)]
pub enum AccessorError {
    #[error("{context} for {target}: database already exists ({source})")]
    AlreadyExists {
        context: &'static str,
        target: String,
        #[source]
        source: AdminError,
    },
    #[error(
        "{context} for {target}: permission denied, check that the caller may administer the database ({source})"
    )]
    PermissionDenied {
        context: &'static str,
        target: String,
        #[source]
        source: AdminError,
    },
    #[error("{context} for {target}: not found ({source})")]
    NotFound {
        context: &'static str,
        target: String,
        #[source]
        source: AdminError,
    },
    #[error("{context} for {target}: {source}")]
    Admin {
        context: &'static str,
        target: String,
        #[source]
        source: AdminError,
    },
    #[error(
        "{context} for {target}: no response within {deadline:?}, the operation may still complete server-side"
    )]
    DeadlineExceeded {
        context: &'static str,
        target: String,
        deadline: Duration,
    },
    #[error("{context} for {target}: cancelled")]
    Cancelled {
        context: &'static str,
        target: String,
    },
    #[error("{context}: {source}")]
    Lifecycle {
        context: &'static str,
        #[source]
        source: Box<AccessorError>,
    },
    #[error(
        "some tables to be created already exist in the target database: {table}. Remove them before proceeding"
    )]
    TableCollision { table: String },
    #[error(
        "minimal downtime schema/schema-and-data migrations to an existing {dialect} database are not supported"
    )]
    UnsupportedMigration { dialect: Dialect },
    #[error(
        "VALUE_CAPTURE_TYPE for change stream {name} is {found}, not NEW_ROW. Update the change stream option or create a new one"
    )]
    ChangeStreamOption { name: String, found: String },
    #[error("{context}: {source}")]
    Query {
        context: &'static str,
        #[source]
        source: QueryError,
    },
    #[error("no default leader found for instance {instance}")]
    NoLeader { instance: String },
    #[error("failed to access secret version {secret_id}: {message}")]
    Secret { secret_id: String, message: String },
    #[error("failed to create Cassandra session: {0}")]
    Cluster(String),
    #[error("background task failed: {0}")]
    Task(String),
}

impl AccessorError {
    pub(crate) fn query(context: &'static str, source: QueryError) -> Self {
        AccessorError::Query { context, source }
    }

    pub(crate) fn lifecycle(context: &'static str, source: AccessorError) -> Self {
        AccessorError::Lifecycle {
            context,
            source: Box::new(source),
        }
    }
}

/// Result type for accessor operations.
pub type Result<T> = std::result::Result<T, AccessorError>;

/// Turn a raw admin failure into a user-facing error, keeping it as the source.
pub fn classify_admin_error(
    admin: &dyn AdminClient,
    context: &'static str,
    target: impl ToString,
    source: AdminError,
) -> AccessorError {
    let target = target.to_string();
    match admin.classify(&source) {
        ErrorClass::AlreadyExists => AccessorError::AlreadyExists {
            context,
            target,
            source,
        },
        ErrorClass::PermissionDenied => AccessorError::PermissionDenied {
            context,
            target,
            source,
        },
        ErrorClass::NotFound => AccessorError::NotFound {
            context,
            target,
            source,
        },
        ErrorClass::Unknown => AccessorError::Admin {
            context,
            target,
            source,
        },
    }
}
