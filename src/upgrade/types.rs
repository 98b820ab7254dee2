//! Upgrade request and remote upgrade record types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::version::types::Version;

/// Lifecycle state of a remote upgrade record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeState {
    NotScheduled,
    Scheduled,
    Started,
    Completed,
    Cancelled,
    Failed,
}

impl UpgradeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotScheduled => "not-scheduled",
            Self::Scheduled => "scheduled",
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    /// Map an upgrade policy state value reported by the server.
    ///
    /// `pending` and `delayed` policies are still waiting for their run
    /// time and are reported as scheduled.
    pub fn from_server(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pending" | "scheduled" | "delayed" => Some(Self::Scheduled),
            "started" => Some(Self::Started),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for UpgradeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpgradeState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "not-scheduled" => Ok(Self::NotScheduled),
            "scheduled" => Ok(Self::Scheduled),
            "started" => Ok(Self::Started),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "failed" => Ok(Self::Failed),
            other => Err(format!(
                "unknown upgrade state '{other}' (expected one of: not-scheduled, scheduled, started, completed, cancelled, failed)"
            )),
        }
    }
}

/// A request to schedule a cluster upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeRequest {
    pub cluster_id: String,
    /// Raw version string exactly as returned by the version source.
    pub target_version: String,
    pub schedule_time: DateTime<Utc>,
    /// Upgrade only the hosted control plane, leaving node pools alone.
    pub control_plane_only: bool,
}

impl UpgradeRequest {
    pub fn new(
        cluster_id: impl Into<String>,
        target: &Version,
        schedule_time: DateTime<Utc>,
        control_plane_only: bool,
    ) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            target_version: target.raw().to_string(),
            schedule_time,
            control_plane_only,
        }
    }
}

/// Snapshot of the remote upgrade record for a cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeRecord {
    pub cluster_id: String,
    pub state: UpgradeState,
    pub next_run_time: Option<DateTime<Utc>>,
    pub policy_id: Option<String>,
    pub version: Option<String>,
}

impl UpgradeRecord {
    /// Record for a cluster with no upgrade policy.
    pub fn not_scheduled(cluster_id: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            state: UpgradeState::NotScheduled,
            next_run_time: None,
            policy_id: None,
            version: None,
        }
    }
}

/// Format a run time the way the server displays it, e.g. `2024-01-02 15:04 UTC`.
pub fn format_next_run(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_state_from_server() {
        assert_eq!(UpgradeState::from_server("scheduled"), Some(UpgradeState::Scheduled));
        assert_eq!(UpgradeState::from_server("pending"), Some(UpgradeState::Scheduled));
        assert_eq!(UpgradeState::from_server("delayed"), Some(UpgradeState::Scheduled));
        assert_eq!(UpgradeState::from_server("Started"), Some(UpgradeState::Started));
        assert_eq!(UpgradeState::from_server("completed"), Some(UpgradeState::Completed));
        assert_eq!(UpgradeState::from_server("cancelled"), Some(UpgradeState::Cancelled));
        assert_eq!(UpgradeState::from_server("failed"), Some(UpgradeState::Failed));
        assert_eq!(UpgradeState::from_server("paused"), None);
    }

    #[test]
    fn test_state_from_str_round_trips_display() {
        for state in [
            UpgradeState::NotScheduled,
            UpgradeState::Scheduled,
            UpgradeState::Started,
            UpgradeState::Completed,
            UpgradeState::Cancelled,
            UpgradeState::Failed,
        ] {
            assert_eq!(state.to_string().parse::<UpgradeState>(), Ok(state));
        }
        assert!("running".parse::<UpgradeState>().is_err());
    }

    #[test]
    fn test_request_keeps_raw_version() {
        let target = Version::parse("4.13.0-rc.2").unwrap();
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 0).unwrap();
        let request = UpgradeRequest::new("abc", &target, time, true);
        assert_eq!(request.target_version, "4.13.0-rc.2");
        assert!(request.control_plane_only);
    }

    #[test]
    fn test_format_next_run() {
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 59).unwrap();
        assert_eq!(format_next_run(&time), "2024-01-02 15:04 UTC");
    }

    #[test]
    fn test_not_scheduled_record() {
        let record = UpgradeRecord::not_scheduled("abc");
        assert_eq!(record.state, UpgradeState::NotScheduled);
        assert!(record.next_run_time.is_none());
    }
}
