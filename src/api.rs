//! Collaborator interfaces consumed by version resolution and upgrade polling.

use anyhow::Result;
use async_trait::async_trait;

use crate::upgrade::types::{UpgradeRecord, UpgradeRequest};

/// Cluster information.
#[derive(Debug, Clone)]
pub struct ClusterInfo {
    pub id: String,
    pub name: String,
    /// Raw version string of the running cluster.
    pub version: String,
    pub channel_group: Option<String>,
    /// Hosted control plane topology.
    pub hosted: bool,
}

impl std::fmt::Display for ClusterInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let topology = if self.hosted { "hosted" } else { "classic" };
        write!(f, "{} ({}) - {}", self.name, self.version, topology)
    }
}

/// Lists raw version strings for a channel group. No ordering is guaranteed.
#[async_trait]
pub trait VersionSource: Send + Sync {
    async fn list_versions(&self, channel_group: &str) -> Result<Vec<String>>;
}

/// Describes clusters.
#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// The running version is `ClusterInfo::version`.
    async fn describe_cluster(&self, cluster_id: &str) -> Result<ClusterInfo>;
}

/// Creates upgrade records. Failures surface as [`crate::error::OcupError::Schedule`].
#[async_trait]
pub trait UpgradeScheduler: Send + Sync {
    async fn schedule(&self, request: &UpgradeRequest) -> Result<UpgradeRecord>;
}

/// Reads the current upgrade record. Failures surface as [`crate::error::OcupError::Query`].
#[async_trait]
pub trait UpgradeQuery: Send + Sync {
    async fn describe(&self, cluster_id: &str) -> Result<UpgradeRecord>;
}
