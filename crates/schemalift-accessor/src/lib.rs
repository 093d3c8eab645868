//! Schema lifecycle operations against a remote database control plane.
//!
//! The admin, query, secret and cluster clients are collaborators expressed
//! as traits; this crate drives them: existence checks that tolerate slow
//! backends, create-or-update decisions, bounded foreign key backfill, and
//! change stream setup.

pub mod accessor;
pub mod admin;
pub mod applier;
pub mod backfill;
pub mod change_stream;
pub mod cluster;
pub mod diagnostics;
pub mod error;
pub mod existence;
pub mod instance;
pub mod lifecycle;
pub mod options;
pub mod progress;
pub mod query;
pub mod secrets;
pub mod verifier;
pub mod waiter;

pub use accessor::DatabaseAccessor;
pub use admin::{
    AdminClient, AdminError, AdminResult, CreateDatabaseRequest, DatabaseInfo, ErrorClass,
    Operation, UpdateDdlRequest,
};
pub use applier::DdlApplier;
pub use backfill::{BackfillReport, DispatchThrottle, ForeignKeyBackfiller};
pub use change_stream::ChangeStreams;
pub use cluster::{connect_cluster, ClusterSession, ClusterSettings, SessionFactory};
pub use diagnostics::{Diagnostics, DiagnosticsReport};
pub use error::{classify_admin_error, AccessorError, Result};
pub use existence::{ExistencePoller, HeartbeatHook};
pub use instance::{leader_location, InstanceAdminClient};
pub use lifecycle::{LifecycleOutcome, SchemaLifecycle};
pub use options::AccessorOptions;
pub use progress::{NoopProgress, ProgressObserver, ProgressTracker, TracingProgress};
pub use query::{QueryClient, QueryError, Row, RowStream, Statement};
pub use secrets::{normalize_secret_id, ResolvedSecret, SecretAccessor, SecretClient};
pub use verifier::validate_table_overlap;
pub use waiter::{wait_operation, WaitError};

pub use schemalift_core::{DatabaseUri, Dialect, MigrationType, SchemaModel};
