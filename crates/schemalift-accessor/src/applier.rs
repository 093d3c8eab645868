use std::sync::Arc;
use std::time::Duration;

use schemalift_core::{DatabaseUri, Dialect};
use tracing::{debug, info};

use crate::admin::{AdminClient, CreateDatabaseRequest, UpdateDdlRequest};
use crate::error::{classify_admin_error, Result};
use crate::waiter::{wait_operation, WaitError};

/// Submits DDL to the control plane and waits for it to land.
#[derive(Clone)]
pub struct DdlApplier {
    admin: Arc<dyn AdminClient>,
    deadline: Duration,
}

impl DdlApplier {
    pub fn new(admin: Arc<dyn AdminClient>, deadline: Duration) -> Self {
        Self { admin, deadline }
    }

    /// Create `database`, sending `extra_statements` inline when the dialect allows it.
    ///
    /// Postgres-dialect databases reject inline DDL; their schema must follow
    /// through [`apply`](Self::apply) once the database exists.
    pub async fn create(
        &self,
        database: &DatabaseUri,
        dialect: Dialect,
        extra_statements: Vec<String>,
    ) -> Result<()> {
        let extra_statements = if dialect.is_postgres() {
            Vec::new()
        } else {
            extra_statements
        };
        let request = CreateDatabaseRequest {
            parent: database.instance_uri(),
            create_statement: create_database_statement(dialect, &database.database),
            dialect,
            extra_statements,
        };
        info!(
            event = "create_database_submitted",
            database = %database,
            dialect = %dialect,
            statements = request.extra_statements.len()
        );

        let op = self
            .admin
            .create_database(request)
            .await
            .map_err(|err| {
                classify_admin_error(
                    self.admin.as_ref(),
                    "can't build CreateDatabaseRequest",
                    database,
                    err,
                )
            })?;
        wait_operation(op, None).await.map_err(|err| {
            err.into_accessor(self.admin.as_ref(), "createDatabase call failed", database)
        })?;

        info!(event = "create_database_finished", database = %database);
        Ok(())
    }

    /// Apply `statements` as one schema update bounded by the configured deadline.
    pub async fn apply(&self, database: &DatabaseUri, statements: Vec<String>) -> Result<()> {
        if statements.is_empty() {
            debug!(event = "update_ddl_skipped", database = %database);
            return Ok(());
        }

        let count = statements.len();
        let request = UpdateDdlRequest {
            database: database.clone(),
            statements,
        };
        info!(event = "update_ddl_submitted", database = %database, statements = count);

        // Large Postgres-dialect schemas can take over a minute to acknowledge.
        let submit_and_wait = async {
            let op = self.admin.update_database_ddl(request).await.map_err(|err| {
                classify_admin_error(
                    self.admin.as_ref(),
                    "can't build UpdateDatabaseDdlRequest",
                    database,
                    err,
                )
            })?;
            wait_operation(op, None).await.map_err(|err| {
                err.into_accessor(self.admin.as_ref(), "UpdateDatabaseDdl call failed", database)
            })
        };

        match tokio::time::timeout(self.deadline, submit_and_wait).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(WaitError::DeadlineExceeded(self.deadline).into_accessor(
                    self.admin.as_ref(),
                    "UpdateDatabaseDdl call failed",
                    database,
                ))
            }
        }

        info!(event = "update_ddl_finished", database = %database, statements = count);
        Ok(())
    }
}

/// `CREATE DATABASE` text for the dialect.
pub fn create_database_statement(dialect: Dialect, name: &str) -> String {
    match dialect {
        Dialect::GoogleStandardSql => format!("CREATE DATABASE `{name}`"),
        // Postgres rejects backticks around the database name.
        Dialect::Postgresql => format!("CREATE DATABASE \"{name}\""),
    }
}
