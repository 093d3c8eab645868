use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::admin::AdminError;
use crate::error::{AccessorError, Result};

/// Client for a secret store.
#[async_trait]
pub trait SecretClient: Send + Sync {
    /// Fetch the payload of a fully qualified secret version.
    async fn access_secret_version(&self, name: &str) -> std::result::Result<Vec<u8>, AdminError>;
}

/// Secret value together with the version id it was read from.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    pub secret_id: String,
    pub value: String,
}

impl std::fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("secret_id", &self.secret_id)
            .field("value", &"***")
            .finish()
    }
}

/// Pin a secret id to a version, defaulting to `latest`.
pub fn normalize_secret_id(secret_id: &str) -> String {
    let trimmed = secret_id.strip_suffix('/').unwrap_or(secret_id);
    if trimmed.contains("/versions/") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/versions/latest")
    }
}

/// Reads secrets through a [`SecretClient`].
#[derive(Clone)]
pub struct SecretAccessor {
    client: Arc<dyn SecretClient>,
}

impl SecretAccessor {
    pub fn new(client: Arc<dyn SecretClient>) -> Self {
        Self { client }
    }

    /// Payload of `secret_id` decoded as UTF-8 (lossy).
    pub async fn get_secret(&self, secret_id: &str) -> Result<String> {
        let payload = self
            .client
            .access_secret_version(secret_id)
            .await
            .map_err(|err| AccessorError::Secret {
                secret_id: secret_id.to_string(),
                message: err.to_string(),
            })?;
        Ok(String::from_utf8_lossy(&payload).into_owned())
    }

    /// Normalize `secret_id`, then fetch it.
    pub async fn fetch_password(&self, secret_id: &str) -> Result<ResolvedSecret> {
        let secret_id = normalize_secret_id(secret_id);
        debug!(event = "secret_requested", secret_id = %secret_id);
        let value = self.get_secret(&secret_id).await?;
        Ok(ResolvedSecret { secret_id, value })
    }
}
