use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

/// Receives progress for a batch of work.
pub trait ProgressObserver: Send + Sync {
    /// Called once per finished item with a strictly increasing `completed`.
    fn on_progress(&self, completed: u64, total: u64);

    /// Called once after every item has been attempted.
    fn on_complete(&self, total: u64);

    /// Called before dispatch when a batch is large enough to be slow.
    fn on_large_batch(&self, _total: u64) {}
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn on_progress(&self, _completed: u64, _total: u64) {}

    fn on_complete(&self, _total: u64) {}
}

/// Logs progress through `tracing` whenever the whole percentage changes.
#[derive(Debug)]
pub struct TracingProgress {
    label: String,
    last_percent: Mutex<Option<u64>>,
}

impl TracingProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            last_percent: Mutex::new(None),
        }
    }
}

impl ProgressObserver for TracingProgress {
    fn on_progress(&self, completed: u64, total: u64) {
        let percent = if total == 0 {
            100
        } else {
            completed * 100 / total
        };
        let mut last = self
            .last_percent
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *last != Some(percent) {
            *last = Some(percent);
            info!(
                event = "progress",
                label = %self.label,
                completed,
                total,
                percent
            );
        }
    }

    fn on_complete(&self, total: u64) {
        info!(event = "progress_complete", label = %self.label, total);
    }
}

/// Lock-guarded completion counter shared by concurrent workers.
///
/// The observer is invoked while the lock is held so reported values reach it
/// in increasing order.
pub struct ProgressTracker {
    total: u64,
    completed: Mutex<u64>,
    observer: Arc<dyn ProgressObserver>,
}

impl ProgressTracker {
    pub fn new(total: u64, observer: Arc<dyn ProgressObserver>) -> Self {
        Self {
            total,
            completed: Mutex::new(0),
            observer,
        }
    }

    /// Record one finished item and return the new count.
    pub fn advance(&self) -> u64 {
        let mut completed = self
            .completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *completed += 1;
        self.observer.on_progress(*completed, self.total);
        *completed
    }

    pub fn completed(&self) -> u64 {
        *self
            .completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn finish(&self) {
        self.observer.on_complete(self.total);
    }
}
