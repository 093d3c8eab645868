use thiserror::Error;

/// Core error type shared across schemalift crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A database URI does not follow `projects/{p}/instances/{i}/databases/{d}`.
    #[error("invalid database uri: {0}")]
    InvalidUri(String),
    /// A dialect name is not recognized.
    #[error("unknown dialect: {0}")]
    UnknownDialect(String),
    /// A migration type name is not recognized.
    #[error("unknown migration type: {0}")]
    UnknownMigrationType(String),
    /// The schema violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Convenience alias for results returned by schemalift crates.
pub type Result<T> = std::result::Result<T, Error>;
