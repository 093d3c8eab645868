use async_trait::async_trait;

use crate::admin::AdminResult;
use crate::error::{AccessorError, Result};

/// Instance metadata needed to find its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
    pub name: String,
    /// `projects/{p}/instanceConfigs/{c}`.
    pub config: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaInfo {
    pub location: String,
    pub default_leader_location: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceConfig {
    pub name: String,
    pub replicas: Vec<ReplicaInfo>,
}

/// Control-plane client for instances.
#[async_trait]
pub trait InstanceAdminClient: Send + Sync {
    async fn get_instance(&self, name: &str) -> AdminResult<InstanceInfo>;

    async fn get_instance_config(&self, name: &str) -> AdminResult<InstanceConfig>;
}

/// Location of the instance's default leader replica.
pub async fn leader_location(client: &dyn InstanceAdminClient, instance: &str) -> Result<String> {
    let info = client
        .get_instance(instance)
        .await
        .map_err(|source| AccessorError::Admin {
            context: "can't get instance",
            target: instance.to_string(),
            source,
        })?;
    let config = client
        .get_instance_config(&info.config)
        .await
        .map_err(|source| AccessorError::Admin {
            context: "can't get instance config",
            target: info.config.clone(),
            source,
        })?;

    config
        .replicas
        .into_iter()
        .find(|replica| replica.default_leader_location)
        .map(|replica| replica.location)
        .ok_or_else(|| AccessorError::NoLeader {
            instance: instance.to_string(),
        })
}
