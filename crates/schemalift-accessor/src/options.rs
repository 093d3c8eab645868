use std::time::Duration;

/// Tunables for talking to the control plane.
#[derive(Debug, Clone)]
pub struct AccessorOptions {
    /// How often a stalled existence check logs a warning.
    pub heartbeat_interval: Duration,
    /// Upper bound on a schema update submission plus its wait.
    pub ddl_deadline: Duration,
    /// Maximum concurrent foreign key requests. Keep well under the admin quota.
    pub max_workers: usize,
    /// Minimum spacing between foreign key dispatches. Zero disables throttling.
    pub dispatch_interval: Duration,
    /// Batch size above which a slow-backfill advisory is logged.
    pub fk_warning_threshold: usize,
}

impl Default for AccessorOptions {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(5 * 60),
            ddl_deadline: Duration::from_secs(5 * 60),
            max_workers: 50,
            dispatch_interval: Duration::from_secs(1),
            fk_warning_threshold: 50,
        }
    }
}
