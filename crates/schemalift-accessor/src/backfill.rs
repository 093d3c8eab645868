//! Parallel foreign key creation after bulk data load.
//!
//! Foreign key creation is slow on the target and each request counts
//! against the administrative quota. Statements are therefore sent one per
//! request, with at most `max_workers` in flight and at most one new
//! request per `dispatch_interval`. A failing statement is logged and
//! recorded in [`Diagnostics`]; it never stops its siblings.

use std::sync::Arc;
use std::time::Duration;

use schemalift_core::{render_ddl, DatabaseUri, DdlConfig, MigrationType, SchemaModel};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::admin::{AdminClient, UpdateDdlRequest};
use crate::diagnostics::Diagnostics;
use crate::error::classify_admin_error;
use crate::options::AccessorOptions;
use crate::progress::{NoopProgress, ProgressObserver, ProgressTracker};
use crate::waiter::wait_operation;

/// Summary of one backfill pass. Every statement is attempted exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Admits at most one dispatch per period.
pub struct DispatchThrottle {
    interval: Option<Interval>,
}

impl DispatchThrottle {
    pub fn new(period: Duration) -> Self {
        let interval = (!period.is_zero()).then(|| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        Self { interval }
    }

    /// Wait until the next dispatch is allowed. The first call returns at once.
    pub async fn admit(&mut self) {
        if let Some(interval) = self.interval.as_mut() {
            interval.tick().await;
        }
    }
}

/// Applies foreign key statements with bounded parallelism.
#[derive(Clone)]
pub struct ForeignKeyBackfiller {
    admin: Arc<dyn AdminClient>,
    options: AccessorOptions,
    diagnostics: Arc<Diagnostics>,
    observer: Arc<dyn ProgressObserver>,
}

impl ForeignKeyBackfiller {
    pub fn new(
        admin: Arc<dyn AdminClient>,
        options: AccessorOptions,
        diagnostics: Arc<Diagnostics>,
    ) -> Self {
        Self {
            admin,
            options,
            diagnostics,
            observer: Arc::new(NoopProgress),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    /// Create the schema's foreign keys on `database`.
    ///
    /// Skipped when they were already sent inline at creation.
    pub async fn apply_foreign_keys(
        &self,
        database: &DatabaseUri,
        schema: &SchemaModel,
        migration: MigrationType,
    ) -> BackfillReport {
        if migration.inlines_foreign_keys(schema.dialect) {
            debug!(event = "foreign_keys_inlined", database = %database);
            return BackfillReport::default();
        }

        // Sequences already exist at this point.
        let config = DdlConfig::for_target(schema.dialect, schema.source.clone())
            .tables(false)
            .foreign_keys(true);
        let statements = render_ddl(&config, &schema.tables, &Default::default());
        self.apply_statements(database, statements).await
    }

    /// Apply each statement as its own schema update.
    pub async fn apply_statements(
        &self,
        database: &DatabaseUri,
        statements: Vec<String>,
    ) -> BackfillReport {
        let total = statements.len();
        if total == 0 {
            return BackfillReport::default();
        }

        if total > self.options.fk_warning_threshold {
            warn!(
                event = "large_foreign_key_batch",
                database = %database,
                statements = total,
                max_workers = self.options.max_workers,
                "Large number of foreign keys detected. The target can take a long time to create \
                 foreign keys (over 5 minutes per batch even with no data) and this tool has no \
                 control over the time a single foreign key takes. Raising max_workers sends more \
                 concurrent requests but risks exceeding the admin quota; requests are spread \
                 over time to stay under it."
            );
            self.observer.on_large_batch(total as u64);
        }
        info!(
            event = "foreign_key_backfill_started",
            database = %database,
            statements = total
        );

        let tracker = Arc::new(ProgressTracker::new(
            total as u64,
            Arc::clone(&self.observer),
        ));
        let slots = Arc::new(Semaphore::new(self.options.max_workers.max(1)));
        let mut throttle = DispatchThrottle::new(self.options.dispatch_interval);
        let mut tasks = JoinSet::new();

        for statement in statements {
            let Ok(permit) = Arc::clone(&slots).acquire_owned().await else {
                break;
            };
            throttle.admit().await;

            let admin = Arc::clone(&self.admin);
            let diagnostics = Arc::clone(&self.diagnostics);
            let tracker = Arc::clone(&tracker);
            let database = database.clone();
            tasks.spawn(async move {
                let applied =
                    apply_foreign_key(admin.as_ref(), &database, statement, &diagnostics).await;
                tracker.advance();
                drop(permit);
                applied
            });
        }

        let mut report = BackfillReport {
            total,
            ..BackfillReport::default()
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(true) => report.succeeded += 1,
                Ok(false) => report.failed += 1,
                Err(err) => {
                    // The task died before advancing progress.
                    tracker.advance();
                    report.failed += 1;
                    self.diagnostics
                        .unexpected(format!("foreign key task failed: {err}"));
                }
            }
        }

        tracker.finish();
        info!(
            event = "foreign_key_backfill_finished",
            database = %database,
            succeeded = report.succeeded,
            failed = report.failed
        );
        report
    }
}

async fn apply_foreign_key(
    admin: &dyn AdminClient,
    database: &DatabaseUri,
    statement: String,
    diagnostics: &Diagnostics,
) -> bool {
    debug!(event = "foreign_key_submitted", statement = %statement);

    let request = UpdateDdlRequest {
        database: database.clone(),
        statements: vec![statement.clone()],
    };
    let outcome = match admin.update_database_ddl(request).await {
        Ok(op) => wait_operation(op, None)
            .await
            .map_err(|err| err.into_accessor(admin, "can't add foreign key", database)),
        Err(err) => Err(classify_admin_error(admin, "can't add foreign key", database, err)),
    };

    match outcome {
        Ok(()) => {
            debug!(event = "foreign_key_applied", statement = %statement);
            true
        }
        Err(err) => {
            warn!(
                event = "foreign_key_skipped",
                statement = %statement,
                error = %err,
                "can't add foreign key, skipping it"
            );
            diagnostics.unexpected(format!(
                "Can't add foreign key with statement {statement}: {err}"
            ));
            false
        }
    }
}
