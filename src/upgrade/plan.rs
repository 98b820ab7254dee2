//! Upgrade target selection, scheduling and post-schedule waits.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::poller::UpgradePoller;
use super::types::{UpgradeRecord, UpgradeRequest, UpgradeState};
use crate::api::{ClusterInfo, ClusterSource, UpgradeQuery, UpgradeScheduler, VersionSource};
use crate::error::OcupError;
use crate::version::catalog;
use crate::version::filter::upgrade_targets;
use crate::version::types::{SortOrder, Version, VersionList};
use crate::version::ystream::{Stream, highest_y_stream_target, lowest_y_stream_target};

/// Channel group used when neither the caller nor the cluster names one.
pub const DEFAULT_CHANNEL_GROUP: &str = "stable";

/// How to pick the upgrade target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelection {
    /// A version string given by the caller; must be an available upgrade.
    Explicit(String),
    /// Oldest minor above the current one.
    LowestYStream,
    /// Newest minor above the current one.
    HighestYStream,
    /// Newest patch of the current minor.
    LatestZStream,
}

/// Resolved upgrade for a cluster.
#[derive(Debug, Clone)]
pub struct UpgradePlan {
    pub cluster: ClusterInfo,
    pub current_version: Version,
    pub target_version: Version,
    pub stream: Stream,
    pub request: UpgradeRequest,
}

/// Configuration for upgrade execution.
pub struct UpgradeConfig {
    pub wait_for_start: bool,
    pub scheduled_timeout_minutes: u64,
    pub started_timeout_minutes: u64,
    pub check_interval_seconds: u64,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            wait_for_start: false,
            scheduled_timeout_minutes: 4,
            started_timeout_minutes: 70,
            check_interval_seconds: 60,
        }
    }
}

/// Cluster, its parsed version and the parsed catalog of its channel group.
pub struct ClusterVersions {
    pub cluster: ClusterInfo,
    pub current: Version,
    pub catalog: VersionList,
}

impl ClusterVersions {
    /// Every GA version above the current one, ascending.
    pub fn available_upgrades(&self) -> VersionList {
        match self.catalog.highest_ga() {
            Some(highest) => {
                upgrade_targets(&self.catalog, &self.current, highest).sorted(SortOrder::Ascending)
            }
            None => VersionList::default(),
        }
    }
}

/// Describe a cluster and parse the version catalog of its channel group.
pub async fn load_cluster_versions<C>(
    client: &C,
    cluster_id: &str,
    channel_group: Option<&str>,
) -> Result<ClusterVersions>
where
    C: VersionSource + ClusterSource + ?Sized,
{
    let (cluster, channel_group, raw_versions) = match channel_group {
        Some(group) => {
            let (cluster, raw_versions) = futures::try_join!(
                client.describe_cluster(cluster_id),
                client.list_versions(group)
            )?;
            (cluster, group.to_string(), raw_versions)
        }
        None => {
            let cluster = client.describe_cluster(cluster_id).await?;
            let group = cluster
                .channel_group
                .clone()
                .unwrap_or_else(|| DEFAULT_CHANNEL_GROUP.to_string());
            let raw_versions = client.list_versions(&group).await?;
            (cluster, group, raw_versions)
        }
    };

    let current = Version::parse(&cluster.version)?;
    debug!(
        "Cluster {} runs {} (channel group: {})",
        cluster.id, current, channel_group
    );

    let catalog = catalog::parse(&raw_versions)?;

    Ok(ClusterVersions {
        cluster,
        current,
        catalog,
    })
}

/// Pick the upgrade target for `current` from `catalog`.
pub fn resolve_target(
    catalog: &VersionList,
    current: &Version,
    selection: &TargetSelection,
) -> Result<Option<Version>> {
    let target = match selection {
        TargetSelection::Explicit(raw) => {
            let requested = Version::parse(raw)?;
            let eligible = match catalog.highest_ga() {
                Some(highest) => upgrade_targets(catalog, current, highest),
                None => VersionList::default(),
            };
            match eligible.find_raw(requested.raw()) {
                Some(v) => Some(v.clone()),
                None => {
                    return Err(OcupError::UpgradeNotPossible(format!(
                        "version {requested} is not an available upgrade from {current}"
                    ))
                    .into());
                }
            }
        }
        TargetSelection::LowestYStream => lowest_y_stream_target(catalog, current),
        TargetSelection::HighestYStream => highest_y_stream_target(catalog, current),
        TargetSelection::LatestZStream => catalog
            .iter()
            .filter(|v| {
                v.is_ga()
                    && v.major() == current.major()
                    && v.minor() == current.minor()
                    && *v > current
            })
            .max()
            .cloned(),
    };

    Ok(target)
}

/// Create an upgrade plan for a cluster.
pub async fn create_upgrade_plan<C>(
    client: &C,
    cluster_id: &str,
    channel_group: Option<&str>,
    selection: &TargetSelection,
    schedule_time: DateTime<Utc>,
) -> Result<UpgradePlan>
where
    C: VersionSource + ClusterSource + ?Sized,
{
    info!("Creating upgrade plan for cluster {}", cluster_id);

    let ClusterVersions {
        cluster,
        current,
        catalog,
    } = load_cluster_versions(client, cluster_id, channel_group).await?;

    let target = resolve_target(&catalog, &current, selection)?.ok_or_else(|| {
        OcupError::NoUpgradeAvailable {
            cluster_id: cluster.id.clone(),
            current: current.raw().to_string(),
        }
    })?;

    let stream = Stream::classify(&current, &target);
    let request = UpgradeRequest::new(&cluster.id, &target, schedule_time, cluster.hosted);
    debug!(
        "Resolved {} upgrade {} -> {} for cluster {}",
        stream, current, target, cluster.id
    );

    Ok(UpgradePlan {
        cluster,
        current_version: current,
        target_version: target,
        stream,
        request,
    })
}

/// Submit the plan's upgrade request and wait for the server to pick it up.
///
/// Waits for `scheduled`, then for `started` when `wait_for_start` is set.
pub async fn execute_upgrade<C>(
    client: &C,
    plan: &UpgradePlan,
    config: &UpgradeConfig,
) -> Result<UpgradeRecord>
where
    C: UpgradeScheduler + UpgradeQuery + ?Sized,
{
    let request = &plan.request;
    if request.schedule_time <= Utc::now() {
        return Err(OcupError::UpgradeNotPossible(format!(
            "schedule time {} is not in the future",
            request.schedule_time.to_rfc3339()
        ))
        .into());
    }

    let scheduled = client.schedule(request).await?;
    info!(
        "Upgrade of cluster {} to {} submitted (policy: {})",
        request.cluster_id,
        request.target_version,
        scheduled.policy_id.as_deref().unwrap_or("unknown")
    );

    let poller = UpgradePoller::new(client)
        .with_interval(Duration::from_secs(config.check_interval_seconds));

    let mut record = poller
        .wait_for_state(
            &request.cluster_id,
            UpgradeState::Scheduled,
            Duration::from_secs(config.scheduled_timeout_minutes.saturating_mul(60)),
        )
        .await?;

    if config.wait_for_start {
        record = poller
            .wait_for_state(
                &request.cluster_id,
                UpgradeState::Started,
                Duration::from_secs(config.started_timeout_minutes.saturating_mul(60)),
            )
            .await?;
    }

    Ok(record)
}
