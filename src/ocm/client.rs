//! OpenShift Cluster Manager REST client.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::{
    ClusterItem, Page, PolicyState, UpgradePolicyItem, UpgradePolicyRequest, VersionItem,
};
use crate::api::{ClusterInfo, ClusterSource, UpgradeQuery, UpgradeScheduler, VersionSource};
use crate::error::OcupError;
use crate::upgrade::types::{UpgradeRecord, UpgradeRequest, UpgradeState};

pub const DEFAULT_API_URL: &str = "https://api.openshift.com";

const API_PREFIX: &str = "/api/clusters_mgmt/v1";
const DEFAULT_PAGE_SIZE: u32 = 100;
/// Upper limit on version pages, for servers that omit `total`.
const MAX_PAGES: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Upgrade type of classic cluster policies.
const CLASSIC_UPGRADE_TYPE: &str = "OSD";
/// Upgrade type of hosted control plane policies.
const CONTROL_PLANE_UPGRADE_TYPE: &str = "ControlPlane";

/// OCM client wrapper for version and upgrade policy operations.
pub struct OcmClient {
    http: reqwest::Client,
    base_url: String,
    token: SecretString,
    page_size: u32,
    max_pages: u32,
}

impl OcmClient {
    /// Create a new OCM client for the given API URL and access token.
    pub fn new(base_url: &str, token: SecretString) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ocup/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| OcupError::transport(module_path!(), e))?;

        debug!("Using OCM API: {}", base_url);

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: MAX_PAGES,
        })
    }

    #[cfg(test)]
    fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[cfg(test)]
    fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// Send an authenticated request and decode the JSON response.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, OcupError> {
        let response = request
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(|e| OcupError::transport(module_path!(), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OcupError::transport(module_path!(), e))?;

        if !status.is_success() {
            return Err(OcupError::api(module_path!(), status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| OcupError::transport(module_path!(), format!("invalid response: {e}")))
    }

    async fn fetch_cluster(&self, cluster_id: &str) -> Result<ClusterItem, OcupError> {
        debug!("Describing cluster: {}", cluster_id);

        self.send(self.http.get(self.url(&format!("/clusters/{cluster_id}"))))
            .await
            .map_err(|e| match e {
                OcupError::Api { status: 404, .. } => {
                    OcupError::ClusterNotFound(cluster_id.to_string())
                }
                other => other,
            })
    }

    async fn fetch_policies(&self, path: &str) -> Result<Vec<UpgradePolicyItem>, OcupError> {
        let page: Page<UpgradePolicyItem> = self.send(self.http.get(self.url(path))).await?;
        Ok(page.items)
    }

    async fn describe_upgrade(&self, cluster_id: &str) -> Result<UpgradeRecord, OcupError> {
        let cluster = self.fetch_cluster(cluster_id).await?;
        let hosted = cluster.hypershift.is_some_and(|h| h.enabled);

        if hosted {
            let policies = self
                .fetch_policies(&format!("/clusters/{cluster_id}/control_plane/upgrade_policies"))
                .await?;

            let Some(policy) = policies.into_iter().next() else {
                return Ok(UpgradeRecord::not_scheduled(cluster_id));
            };
            let state = policy.state.as_ref().map(|s| s.value.clone());
            return to_record(cluster_id, policy, state.as_deref());
        }

        let policies = self
            .fetch_policies(&format!("/clusters/{cluster_id}/upgrade_policies"))
            .await?;

        let Some(policy) = policies
            .into_iter()
            .find(|p| p.upgrade_type.as_deref() == Some(CLASSIC_UPGRADE_TYPE))
        else {
            return Ok(UpgradeRecord::not_scheduled(cluster_id));
        };

        let state: PolicyState = self
            .send(self.http.get(self.url(&format!(
                "/clusters/{cluster_id}/upgrade_policies/{}/state",
                policy.id
            ))))
            .await?;

        to_record(cluster_id, policy, Some(&state.value))
    }
}

/// Build an upgrade record from a policy and its state value.
fn to_record(
    cluster_id: &str,
    policy: UpgradePolicyItem,
    state: Option<&str>,
) -> Result<UpgradeRecord, OcupError> {
    let state = match state {
        Some(value) => UpgradeState::from_server(value).ok_or_else(|| {
            OcupError::Query(format!(
                "unrecognized state '{value}' for upgrade policy {}",
                policy.id
            ))
        })?,
        None => UpgradeState::Scheduled,
    };

    Ok(UpgradeRecord {
        cluster_id: cluster_id.to_string(),
        state,
        next_run_time: policy.next_run,
        policy_id: Some(policy.id),
        version: policy.version,
    })
}

#[async_trait]
impl VersionSource for OcmClient {
    async fn list_versions(&self, channel_group: &str) -> Result<Vec<String>> {
        debug!("Listing versions in channel group: {}", channel_group);

        let search = format!("channel_group='{channel_group}' and enabled='t'");
        let mut versions = Vec::new();
        let mut page_number: u32 = 1;

        loop {
            let request = self.http.get(self.url("/versions")).query(&[
                ("search", search.clone()),
                ("page", page_number.to_string()),
                ("size", self.page_size.to_string()),
            ]);
            let page: Page<VersionItem> = self.send(request).await?;

            let count = page.items.len();
            versions.extend(page.items.into_iter().map(|item| item.raw_id));

            let fetched = versions.len() as u32;
            if count < self.page_size as usize || (page.total > 0 && fetched >= page.total) {
                break;
            }
            if page_number >= self.max_pages {
                warn!(
                    "Stopped listing versions after {} pages ({} versions)",
                    page_number, fetched
                );
                break;
            }
            page_number += 1;
        }

        debug!("Found {} versions", versions.len());
        Ok(versions)
    }
}

#[async_trait]
impl ClusterSource for OcmClient {
    async fn describe_cluster(&self, cluster_id: &str) -> Result<ClusterInfo> {
        let cluster = self.fetch_cluster(cluster_id).await?;

        let (version, channel_group) = cluster
            .version
            .map(|v| (v.raw_id, v.channel_group))
            .unwrap_or_default();

        Ok(ClusterInfo {
            id: cluster.id,
            name: cluster.name,
            version,
            channel_group,
            hosted: cluster.hypershift.is_some_and(|h| h.enabled),
        })
    }
}

#[async_trait]
impl UpgradeScheduler for OcmClient {
    async fn schedule(&self, request: &UpgradeRequest) -> Result<UpgradeRecord> {
        let cluster_id = request.cluster_id.as_str();
        let (path, upgrade_type) = if request.control_plane_only {
            (
                format!("/clusters/{cluster_id}/control_plane/upgrade_policies"),
                CONTROL_PLANE_UPGRADE_TYPE,
            )
        } else {
            (
                format!("/clusters/{cluster_id}/upgrade_policies"),
                CLASSIC_UPGRADE_TYPE,
            )
        };

        debug!(
            "Scheduling {} upgrade of cluster {} to {} at {}",
            upgrade_type,
            cluster_id,
            request.target_version,
            request.schedule_time.to_rfc3339()
        );

        let body = UpgradePolicyRequest {
            schedule_type: "manual",
            upgrade_type,
            version: &request.target_version,
            next_run: request.schedule_time,
        };

        let policy: UpgradePolicyItem = self
            .send(self.http.post(self.url(&path)).json(&body))
            .await
            .map_err(|e| OcupError::Schedule(e.to_string()))?;

        let state = policy.state.as_ref().map(|s| s.value.clone());
        let record = to_record(cluster_id, policy, state.as_deref())
            .map_err(|e| OcupError::Schedule(e.to_string()))?;
        Ok(record)
    }
}

#[async_trait]
impl UpgradeQuery for OcmClient {
    async fn describe(&self, cluster_id: &str) -> Result<UpgradeRecord> {
        let record = self
            .describe_upgrade(cluster_id)
            .await
            .map_err(|e| match e {
                OcupError::Query(_) => e,
                other => OcupError::Query(other.to_string()),
            })?;
        Ok(record)
    }
}
