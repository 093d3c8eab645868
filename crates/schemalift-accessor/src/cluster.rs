use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::error::{AccessorError, Result};

/// Read/write consistency level requested from the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consistency {
    Quorum,
}

/// How the driver picks coordinator hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSelection {
    RoundRobin,
    DcAwareRoundRobin { local_dc: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Immutable connection settings for a Cassandra-compatible cluster.
///
/// Built once and handed to a [`SessionFactory`]; nothing is shared
/// process-wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSettings {
    pub contact_points: Vec<String>,
    pub port: Option<u16>,
    pub keyspace: String,
    pub consistency: Consistency,
    pub timeout: Duration,
    pub retries: u32,
    pub credentials: Option<Credentials>,
    pub host_selection: HostSelection,
}

impl ClusterSettings {
    /// Settings with quorum consistency, a 10 second timeout and 3 retries.
    pub fn new(contact_points: Vec<String>, keyspace: impl Into<String>) -> Self {
        Self {
            contact_points,
            port: None,
            keyspace: keyspace.into(),
            consistency: Consistency::Quorum,
            timeout: Duration::from_secs(10),
            retries: 3,
            credentials: None,
            host_selection: HostSelection::RoundRobin,
        }
    }

    /// Use `port` when it is positive; zero keeps the driver default.
    pub fn port(mut self, port: u16) -> Self {
        self.port = (port > 0).then_some(port);
        self
    }

    /// Authenticate with a password only when `username` is set.
    pub fn credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = (!username.is_empty()).then(|| Credentials {
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }

    /// Prefer hosts in `datacenter` when it is set.
    pub fn datacenter(mut self, datacenter: &str) -> Self {
        self.host_selection = if datacenter.is_empty() {
            HostSelection::RoundRobin
        } else {
            HostSelection::DcAwareRoundRobin {
                local_dc: datacenter.to_string(),
            }
        };
        self
    }
}

/// Live session against the cluster.
pub trait ClusterSession: Send + Sync {
    fn keyspace(&self) -> &str;
}

/// Opens sessions from settings. Implemented over the actual driver.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create_session(
        &self,
        settings: &ClusterSettings,
    ) -> std::result::Result<Box<dyn ClusterSession>, String>;
}

/// Open a session, wrapping driver failures.
pub async fn connect_cluster(
    factory: &dyn SessionFactory,
    settings: &ClusterSettings,
) -> Result<Box<dyn ClusterSession>> {
    let session = factory
        .create_session(settings)
        .await
        .map_err(AccessorError::Cluster)?;
    info!(
        event = "cluster_session_created",
        keyspace = %settings.keyspace,
        contact_points = settings.contact_points.len()
    );
    Ok(session)
}
