use std::sync::Arc;

use schemalift_core::DatabaseUri;
use tracing::{debug, info};

use crate::admin::{AdminClient, UpdateDdlRequest};
use crate::error::{classify_admin_error, AccessorError, Result};
use crate::query::{QueryClient, Statement};
use crate::waiter::wait_operation;

/// Value capture type downstream pipelines require.
pub const REQUIRED_VALUE_CAPTURE_TYPE: &str = "NEW_ROW";

/// Manages the change stream consumed by streaming migrations.
#[derive(Clone)]
pub struct ChangeStreams {
    admin: Arc<dyn AdminClient>,
    query: Arc<dyn QueryClient>,
}

impl ChangeStreams {
    pub fn new(admin: Arc<dyn AdminClient>, query: Arc<dyn QueryClient>) -> Self {
        Self { admin, query }
    }

    /// Whether a change stream called `name` exists on `database`.
    pub async fn exists(&self, name: &str, database: &DatabaseUri) -> Result<bool> {
        let statement =
            Statement::new("SELECT CHANGE_STREAM_NAME FROM information_schema.change_streams");
        let mut rows = self
            .query
            .single_query(database, statement)
            .await
            .map_err(|err| AccessorError::query("couldn't query change_streams table", err))?;

        while let Some(row) = rows
            .next()
            .await
            .map_err(|err| AccessorError::query("couldn't read row from change_streams table", err))?
        {
            let found = row
                .string(0)
                .map_err(|err| AccessorError::query("can't scan row from change_streams table", err))?;
            if found == name {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Check that `name` captures new rows.
    pub async fn validate_options(&self, name: &str, database: &DatabaseUri) -> Result<()> {
        let statement = Statement::new(
            "SELECT option_value FROM information_schema.change_stream_options \
             WHERE change_stream_name = @p1 AND option_name = 'value_capture_type'",
        )
        .param("p1", name);
        let mut rows = self
            .query
            .single_query(database, statement)
            .await
            .map_err(|err| {
                AccessorError::query("couldn't query change_stream_options table", err)
            })?;

        while let Some(row) = rows.next().await.map_err(|err| {
            AccessorError::query("couldn't read row from change_stream_options table", err)
        })? {
            let value = row.string(0).map_err(|err| {
                AccessorError::query("can't scan row from change_stream_options table", err)
            })?;
            if value != REQUIRED_VALUE_CAPTURE_TYPE {
                return Err(AccessorError::ChangeStreamOption {
                    name: name.to_string(),
                    found: value,
                });
            }
        }
        Ok(())
    }

    /// Create `name` over all tables with the required options.
    pub async fn create(&self, name: &str, database: &DatabaseUri) -> Result<()> {
        let request = UpdateDdlRequest {
            database: database.clone(),
            statements: vec![create_change_stream_statement(name)],
        };
        let op = self
            .admin
            .update_database_ddl(request)
            .await
            .map_err(|err| {
                classify_admin_error(
                    self.admin.as_ref(),
                    "cannot submit create change stream request",
                    database,
                    err,
                )
            })?;
        wait_operation(op, None).await.map_err(|err| {
            err.into_accessor(self.admin.as_ref(), "could not update database ddl", database)
        })?;

        info!(event = "change_stream_created", database = %database, change_stream = name);
        Ok(())
    }

    /// Create `name` when missing, otherwise validate its options.
    pub async fn ensure(&self, name: &str, database: &DatabaseUri) -> Result<()> {
        if self.exists(name, database).await? {
            debug!(event = "change_stream_exists", database = %database, change_stream = name);
            self.validate_options(name, database).await
        } else {
            self.create(name, database).await
        }
    }
}

/// DDL creating a change stream over every table.
pub fn create_change_stream_statement(name: &str) -> String {
    format!(
        "CREATE CHANGE STREAM {name} FOR ALL OPTIONS (value_capture_type = 'NEW_ROW', retention_period = '7d')"
    )
}
