use std::sync::Arc;
use std::time::Duration;

use schemalift_core::DatabaseUri;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::admin::{AdminClient, ErrorClass};
use crate::error::{classify_admin_error, AccessorError, Result};

/// Called with the running heartbeat count each time a check stalls.
pub type HeartbeatHook = Arc<dyn Fn(u32) + Send + Sync>;

/// Checks whether a database exists without ever timing out the call.
///
/// Control-plane metadata calls can legitimately take minutes, so instead of
/// a timeout the poller logs a warning every `heartbeat_interval` until the
/// call returns.
#[derive(Clone)]
pub struct ExistencePoller {
    admin: Arc<dyn AdminClient>,
    heartbeat_interval: Duration,
    on_heartbeat: Option<HeartbeatHook>,
}

impl ExistencePoller {
    pub fn new(admin: Arc<dyn AdminClient>, heartbeat_interval: Duration) -> Self {
        Self {
            admin,
            heartbeat_interval,
            on_heartbeat: None,
        }
    }

    pub fn with_heartbeat_hook(mut self, hook: HeartbeatHook) -> Self {
        self.on_heartbeat = Some(hook);
        self
    }

    /// Returns `Ok(false)` when the backend reports the database as missing.
    pub async fn exists(&self, database: &DatabaseUri) -> Result<bool> {
        self.exists_with_cancel(database, &CancellationToken::new())
            .await
    }

    /// Like [`exists`](Self::exists), aborting the call if `cancel` fires.
    pub async fn exists_with_cancel(
        &self,
        database: &DatabaseUri,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let admin = Arc::clone(&self.admin);
        let target = database.clone();
        let mut call = tokio::spawn(async move { admin.get_database(&target).await });

        let period = self.heartbeat_interval.max(Duration::from_millis(1));
        let mut heartbeat = interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stalls = 0u32;

        let outcome = loop {
            tokio::select! {
                joined = &mut call => break joined,
                _ = heartbeat.tick() => {
                    stalls += 1;
                    warn!(
                        event = "existence_check_stalled",
                        database = %database,
                        waited_secs = (period * stalls).as_secs(),
                        "API call not responding: make sure that the admin endpoint is configured properly"
                    );
                    if let Some(hook) = &self.on_heartbeat {
                        hook(stalls);
                    }
                }
                _ = cancel.cancelled() => {
                    call.abort();
                    return Err(AccessorError::Cancelled {
                        context: "can't get database info",
                        target: database.to_string(),
                    });
                }
            }
        };

        match outcome {
            Ok(Ok(_info)) => Ok(true),
            Ok(Err(err)) if self.admin.classify(&err) == ErrorClass::NotFound => {
                debug!(event = "database_absent", database = %database);
                Ok(false)
            }
            Ok(Err(err)) => Err(classify_admin_error(
                self.admin.as_ref(),
                "can't get database info",
                database,
                err,
            )),
            Err(join) => Err(AccessorError::Task(join.to_string())),
        }
    }
}
