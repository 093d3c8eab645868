use std::sync::Arc;

use schemalift_core::{DatabaseUri, Dialect, MigrationType, SchemaModel};
use tracing::info;

use crate::admin::AdminClient;
use crate::backfill::{BackfillReport, ForeignKeyBackfiller};
use crate::change_stream::ChangeStreams;
use crate::diagnostics::Diagnostics;
use crate::error::{classify_admin_error, AccessorError, Result};
use crate::lifecycle::{LifecycleOutcome, SchemaLifecycle};
use crate::options::AccessorOptions;
use crate::progress::{ProgressObserver, TracingProgress};
use crate::query::{QueryClient, Statement};

/// Entry point bundling the admin and query collaborators.
///
/// Holds only generic operations that several workflows share.
#[derive(Clone)]
pub struct DatabaseAccessor {
    admin: Arc<dyn AdminClient>,
    query: Arc<dyn QueryClient>,
    lifecycle: SchemaLifecycle,
    backfiller: ForeignKeyBackfiller,
    change_streams: ChangeStreams,
}

impl DatabaseAccessor {
    pub fn new(
        admin: Arc<dyn AdminClient>,
        query: Arc<dyn QueryClient>,
        options: AccessorOptions,
    ) -> Self {
        let diagnostics = Arc::new(Diagnostics::new());
        Self {
            lifecycle: SchemaLifecycle::new(Arc::clone(&admin), &options),
            backfiller: ForeignKeyBackfiller::new(Arc::clone(&admin), options, diagnostics)
                .with_observer(Arc::new(TracingProgress::new("foreign keys"))),
            change_streams: ChangeStreams::new(Arc::clone(&admin), Arc::clone(&query)),
            admin,
            query,
        }
    }

    /// Report foreign key progress to `observer`.
    pub fn with_progress(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.backfiller = self.backfiller.with_observer(observer);
        self
    }

    pub fn lifecycle(&self) -> &SchemaLifecycle {
        &self.lifecycle
    }

    pub fn backfiller(&self) -> &ForeignKeyBackfiller {
        &self.backfiller
    }

    pub fn change_streams(&self) -> &ChangeStreams {
        &self.change_streams
    }

    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        self.backfiller.diagnostics()
    }

    pub async fn database_dialect(&self, database: &DatabaseUri) -> Result<Dialect> {
        let info = self.admin.get_database(database).await.map_err(|err| {
            classify_admin_error(self.admin.as_ref(), "cannot connect to database", database, err)
        })?;
        Ok(info.dialect)
    }

    pub async fn check_existing_db(&self, database: &DatabaseUri) -> Result<bool> {
        self.lifecycle.poller().exists(database).await
    }

    /// Create a database with no schema.
    pub async fn create_empty_database(&self, database: &DatabaseUri, dialect: Dialect) -> Result<()> {
        self.lifecycle
            .applier()
            .create(database, dialect, Vec::new())
            .await
    }

    pub async fn drop_database(&self, database: &DatabaseUri) -> Result<()> {
        self.admin.drop_database(database).await.map_err(|err| {
            classify_admin_error(
                self.admin.as_ref(),
                "can't build DropDatabaseRequest",
                database,
                err,
            )
        })?;
        info!(event = "database_dropped", database = %database);
        Ok(())
    }

    /// Create or update `database`, then backfill foreign keys that were not inlined.
    pub async fn migrate_schema(
        &self,
        database: &DatabaseUri,
        schema: &SchemaModel,
        migration: MigrationType,
        existing_tables: &[String],
    ) -> Result<(LifecycleOutcome, BackfillReport)> {
        let outcome = self
            .lifecycle
            .create_or_update(database, schema, migration, existing_tables)
            .await?;
        let report = self
            .backfiller
            .apply_foreign_keys(database, schema, migration)
            .await;
        Ok((outcome, report))
    }

    /// Lower-cased names of user tables, or nothing when the database is absent.
    pub async fn list_table_names(
        &self,
        database: &DatabaseUri,
        dialect: Dialect,
    ) -> Result<Vec<String>> {
        if !self.check_existing_db(database).await? {
            return Ok(Vec::new());
        }

        let statement = Statement::new(
            "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_SCHEMA = @schema",
        )
        .param("schema", dialect.user_table_schema());
        let mut rows = self
            .query
            .single_query(database, statement)
            .await
            .map_err(|err| AccessorError::query("error reading table names", err))?;

        let mut names = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|err| AccessorError::query("error reading table names", err))?
        {
            let name = row
                .string(0)
                .map_err(|err| AccessorError::query("error scanning table name", err))?;
            names.push(name.to_lowercase());
        }
        Ok(names)
    }

    pub async fn table_exists(&self, database: &DatabaseUri, table: &str) -> Result<bool> {
        let statement = Statement::new(
            "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_NAME = @table",
        )
        .param("table", table);
        let mut rows = self
            .query
            .single_query(database, statement)
            .await
            .map_err(|err| AccessorError::query("error checking table existence", err))?;
        let first = rows
            .next()
            .await
            .map_err(|err| AccessorError::query("error checking table existence", err))?;
        Ok(first.is_some())
    }

    /// Run `sql` and fail if the first fetch reports anything but end of rows.
    pub async fn validate_dml(&self, database: &DatabaseUri, sql: &str) -> Result<()> {
        let mut rows = self
            .query
            .single_query(database, Statement::new(sql))
            .await
            .map_err(|err| AccessorError::query("invalid statement", err))?;
        rows.next()
            .await
            .map(|_| ())
            .map_err(|err| AccessorError::query("invalid statement", err))
    }
}
