use std::time::Duration;

use crate::admin::{AdminClient, AdminError, Operation};
use crate::error::{classify_admin_error, AccessorError};

/// Outcome of waiting on a long-running operation.
#[derive(Debug)]
pub enum WaitError {
    /// The operation finished with an error.
    Failed(AdminError),
    /// The caller's deadline passed first. The operation keeps running
    /// server-side; nothing here cancels it.
    DeadlineExceeded(Duration),
}

impl WaitError {
    /// Convert into an accessor error naming the operation and target.
    pub fn into_accessor(
        self,
        admin: &dyn AdminClient,
        context: &'static str,
        target: impl ToString,
    ) -> AccessorError {
        match self {
            WaitError::Failed(source) => classify_admin_error(admin, context, target, source),
            WaitError::DeadlineExceeded(deadline) => AccessorError::DeadlineExceeded {
                context,
                target: target.to_string(),
                deadline,
            },
        }
    }
}

/// Wait for `operation` to finish, optionally bounded by `deadline`.
pub async fn wait_operation(
    operation: Box<dyn Operation>,
    deadline: Option<Duration>,
) -> Result<(), WaitError> {
    match deadline {
        Some(deadline) => match tokio::time::timeout(deadline, operation.wait()).await {
            Ok(result) => result.map_err(WaitError::Failed),
            Err(_) => Err(WaitError::DeadlineExceeded(deadline)),
        },
        None => operation.wait().await.map_err(WaitError::Failed),
    }
}
