use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// Shared sink for conditions that degrade a run without failing it.
#[derive(Debug, Default)]
pub struct Diagnostics {
    unexpected: Mutex<Vec<String>>,
}

/// Point-in-time copy of [`Diagnostics`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticsReport {
    pub unexpected: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an unexpected condition. Safe to call from many tasks.
    pub fn unexpected(&self, message: impl Into<String>) {
        self.unexpected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.into());
    }

    pub fn unexpected_count(&self) -> usize {
        self.unexpected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn report(&self) -> DiagnosticsReport {
        DiagnosticsReport {
            unexpected: self
                .unexpected
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}
