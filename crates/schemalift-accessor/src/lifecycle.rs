use std::fmt;
use std::sync::Arc;

use schemalift_core::{render_ddl, DatabaseUri, DdlConfig, Dialect, MigrationType, SchemaModel};
use tracing::info;

use crate::admin::AdminClient;
use crate::applier::DdlApplier;
use crate::error::{AccessorError, Result};
use crate::existence::ExistencePoller;
use crate::options::AccessorOptions;
use crate::verifier::validate_table_overlap;

/// Terminal state of [`SchemaLifecycle::create_or_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
    Created,
    Updated,
}

impl fmt::Display for LifecycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleOutcome::Created => f.write_str("created"),
            LifecycleOutcome::Updated => f.write_str("updated"),
        }
    }
}

/// Decides between creating and evolving a database, then applies the schema.
///
/// Foreign keys that are not sent inline at creation are left to the
/// [`ForeignKeyBackfiller`](crate::backfill::ForeignKeyBackfiller).
#[derive(Clone)]
pub struct SchemaLifecycle {
    poller: ExistencePoller,
    applier: DdlApplier,
}

impl SchemaLifecycle {
    pub fn new(admin: Arc<dyn AdminClient>, options: &AccessorOptions) -> Self {
        Self {
            poller: ExistencePoller::new(Arc::clone(&admin), options.heartbeat_interval),
            applier: DdlApplier::new(admin, options.ddl_deadline),
        }
    }

    pub fn poller(&self) -> &ExistencePoller {
        &self.poller
    }

    pub fn applier(&self) -> &DdlApplier {
        &self.applier
    }

    /// Update `database` if it exists, otherwise create it.
    pub async fn create_or_update(
        &self,
        database: &DatabaseUri,
        schema: &SchemaModel,
        migration: MigrationType,
        existing_tables: &[String],
    ) -> Result<LifecycleOutcome> {
        let exists = self.verify_db(database, schema, existing_tables).await?;

        if exists {
            // Kept as-is: only the default dialect refuses streaming migrations
            // onto an existing database.
            if schema.dialect == Dialect::GoogleStandardSql
                && migration == MigrationType::Dataflow
            {
                return Err(AccessorError::UnsupportedMigration {
                    dialect: schema.dialect,
                });
            }
            self.update_database(database, schema)
                .await
                .map_err(|err| AccessorError::lifecycle("can't update database schema", err))?;
            info!(event = "lifecycle_finished", database = %database, outcome = "updated");
            Ok(LifecycleOutcome::Updated)
        } else {
            self.create_database(database, schema, migration)
                .await
                .map_err(|err| AccessorError::lifecycle("can't create database", err))?;
            info!(event = "lifecycle_finished", database = %database, outcome = "created");
            Ok(LifecycleOutcome::Created)
        }
    }

    /// Check existence and, when the database exists, that no table would collide.
    pub async fn verify_db(
        &self,
        database: &DatabaseUri,
        schema: &SchemaModel,
        existing_tables: &[String],
    ) -> Result<bool> {
        let exists = self.poller.exists(database).await?;
        if exists {
            validate_table_overlap(schema, existing_tables)?;
        }
        Ok(exists)
    }

    /// Create a new database carrying the schema.
    pub async fn create_database(
        &self,
        database: &DatabaseUri,
        schema: &SchemaModel,
        migration: MigrationType,
    ) -> Result<()> {
        let dialect = schema.dialect;
        let extra = if dialect.is_postgres() {
            Vec::new()
        } else {
            let config = DdlConfig::for_target(dialect, schema.source.clone())
                .foreign_keys(migration.inlines_foreign_keys(dialect));
            render_ddl(&config, &schema.tables, &schema.sequences)
        };

        self.applier.create(database, dialect, extra).await?;

        if dialect.is_postgres() {
            self.update_database(database, schema).await?;
        }
        Ok(())
    }

    /// Apply tables and sequences to an existing database. Foreign keys are excluded.
    pub async fn update_database(&self, database: &DatabaseUri, schema: &SchemaModel) -> Result<()> {
        let config = DdlConfig::for_target(schema.dialect, schema.source.clone());
        let statements = render_ddl(&config, &schema.tables, &schema.sequences);
        self.applier.apply(database, statements).await
    }
}
