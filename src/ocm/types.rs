//! Wire types for the clusters_mgmt API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Paged list response.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct VersionItem {
    pub raw_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ClusterItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub version: Option<ClusterVersion>,
    pub hypershift: Option<Hypershift>,
}

#[derive(Debug, Deserialize)]
pub struct ClusterVersion {
    pub raw_id: String,
    pub channel_group: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Hypershift {
    #[serde(default)]
    pub enabled: bool,
}

/// Body for creating a classic or control plane upgrade policy.
#[derive(Debug, Serialize)]
pub struct UpgradePolicyRequest<'a> {
    pub schedule_type: &'a str,
    pub upgrade_type: &'a str,
    pub version: &'a str,
    pub next_run: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpgradePolicyItem {
    pub id: String,
    pub upgrade_type: Option<String>,
    pub version: Option<String>,
    pub next_run: Option<DateTime<Utc>>,
    /// Only present inline on control plane policies.
    pub state: Option<PolicyState>,
}

#[derive(Debug, Deserialize)]
pub struct PolicyState {
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_cluster() {
        let json = r#"{
            "kind": "Cluster",
            "id": "abc123",
            "name": "prod",
            "version": {"kind": "Version", "id": "openshift-v4.12.10", "raw_id": "4.12.10", "channel_group": "stable"},
            "hypershift": {"enabled": true}
        }"#;
        let cluster: ClusterItem = serde_json::from_str(json).unwrap();
        assert_eq!(cluster.id, "abc123");
        assert_eq!(cluster.version.unwrap().raw_id, "4.12.10");
        assert!(cluster.hypershift.unwrap().enabled);
    }

    #[test]
    fn test_deserialize_empty_page() {
        let page: Page<VersionItem> = serde_json::from_str(r#"{"kind": "VersionList"}"#).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_deserialize_policy_page_without_items() {
        let page: Page<UpgradePolicyItem> =
            serde_json::from_str(r#"{"kind": "UpgradePolicyList", "total": 0}"#).unwrap();
        assert!(page.items.is_empty());

        let page: Page<UpgradePolicyItem> = serde_json::from_str(
            r#"{"items": [{"id": "cp-1", "upgrade_type": "ControlPlane", "state": {"value": "pending"}}]}"#,
        )
        .unwrap();
        assert_eq!(page.items[0].id, "cp-1");
        assert_eq!(page.items[0].state.as_ref().unwrap().value, "pending");
    }

    #[test]
    fn test_serialize_policy_request() {
        use chrono::TimeZone;

        let body = UpgradePolicyRequest {
            schedule_type: "manual",
            upgrade_type: "OSD",
            version: "4.13.0",
            next_run: Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 0).unwrap(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["upgrade_type"], "OSD");
        assert_eq!(value["next_run"], "2024-01-02T15:04:00Z");
    }
}
