//! Core contracts and helpers for schemalift.
//!
//! This crate defines the schema model applied to a target database, the
//! dialect and URI types, DDL rendering, and validation helpers shared by the
//! accessor and the CLI.

pub mod constraints;
pub mod ddl;
pub mod dialect;
pub mod error;
pub mod graph;
pub mod schema;
pub mod types;
pub mod uri;
pub mod validation;

pub use constraints::{FkAction, ForeignKey, Interleave};
pub use ddl::{render_ddl, DdlConfig};
pub use dialect::{Dialect, MigrationType};
pub use error::{Error, Result};
pub use graph::{build_interleave_order, table_order, InterleaveOrder};
pub use schema::{Column, SchemaModel, Table};
pub use types::{BaseType, ColumnType, Sequence, SequenceKind};
pub use uri::DatabaseUri;
pub use validation::validate_schema;

/// Current schema contract version for `schema.json` artifacts.
pub const SCHEMA_VERSION: &str = "0.1";
