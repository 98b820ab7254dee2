//! Custom error types for ocup.

use thiserror::Error;

/// Errors that can occur during version resolution and upgrade scheduling.
#[derive(Error, Debug)]
pub enum OcupError {
    #[error("[{component}] HTTP {status}: {message}")]
    Api {
        component: String,
        status: u16,
        message: String,
    },

    #[error("[{0}] {1}")]
    Transport(String, String),

    #[error("Cluster not found: {0}")]
    ClusterNotFound(String),

    #[error("Invalid version format: {0}")]
    MalformedVersion(String),

    #[error("Failed to schedule upgrade: {0}")]
    Schedule(String),

    #[error("Failed to query upgrade: {0}")]
    Query(String),

    #[error("Upgrade not possible: {0}")]
    UpgradeNotPossible(String),

    #[error("No available upgrade for cluster {cluster_id} (current version {current})")]
    NoUpgradeAvailable { cluster_id: String, current: String },

    #[error("Upgrade of cluster {cluster_id} ended in state {state}")]
    UpgradeTerminated { cluster_id: String, state: String },

    #[error(
        "Timeout after {minutes} minutes waiting for upgrade of cluster {cluster_id} to reach state {state}"
    )]
    Timeout {
        cluster_id: String,
        state: String,
        minutes: u64,
    },

    #[error("Operation cancelled by user")]
    UserCancelled,
}

impl OcupError {
    /// Create an API error from a non-success HTTP response body.
    /// Prefers the `reason` field of OCM error documents over the raw body.
    pub fn api(component: &str, status: u16, body: &str) -> Self {
        Self::Api {
            component: component.to_string(),
            status,
            message: Self::extract_error_details(body),
        }
    }

    /// Create a transport error from any error type.
    pub fn transport<E: std::fmt::Display>(component: &str, err: E) -> Self {
        Self::Transport(component.to_string(), err.to_string())
    }

    /// Extract a single-line message from an OCM error body.
    fn extract_error_details(body: &str) -> String {
        // OCM errors look like {"kind":"Error","code":"CLUSTERS-MGMT-404","reason":"..."}
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
            && let Some(reason) = value.get("reason").and_then(|r| r.as_str())
        {
            return reason.to_string();
        }

        let trimmed = body.trim();
        if !trimmed.is_empty() {
            return trimmed.lines().next().unwrap_or_default().to_string();
        }

        "OCM API request failed".to_string()
    }

    /// Returns true if the awaited outcome is still pending rather than failed.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_cluster_not_found() {
        let err = OcupError::ClusterNotFound("my-cluster".to_string());
        assert_eq!(err.to_string(), "Cluster not found: my-cluster");
    }

    #[test]
    fn test_error_display_malformed_version() {
        let err = OcupError::MalformedVersion("4.x".to_string());
        assert_eq!(err.to_string(), "Invalid version format: 4.x");
    }

    #[test]
    fn test_error_display_timeout() {
        let err = OcupError::Timeout {
            cluster_id: "abc123".to_string(),
            state: "scheduled".to_string(),
            minutes: 4,
        };
        assert_eq!(
            err.to_string(),
            "Timeout after 4 minutes waiting for upgrade of cluster abc123 to reach state scheduled"
        );
        assert!(err.is_timeout());
    }

    #[test]
    fn test_error_api_extracts_reason() {
        let body = r#"{"kind":"Error","id":"404","code":"CLUSTERS-MGMT-404","reason":"Cluster 'abc' not found"}"#;
        let err = OcupError::api("ocm::client", 404, body);
        assert_eq!(err.to_string(), "[ocm::client] HTTP 404: Cluster 'abc' not found");
    }

    #[test]
    fn test_error_api_falls_back_to_first_line() {
        let err = OcupError::api("ocm::client", 502, "Bad Gateway\n<html>");
        assert_eq!(err.to_string(), "[ocm::client] HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_error_api_empty_body() {
        let err = OcupError::api("ocm::client", 500, "  ");
        assert!(err.to_string().contains("OCM API request failed"));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_error_transport_helper() {
        let err = OcupError::transport("ocm::client", "connection refused");
        assert_eq!(err.to_string(), "[ocm::client] connection refused");
    }

    #[test]
    fn test_error_display_user_cancelled() {
        let err = OcupError::UserCancelled;
        assert_eq!(err.to_string(), "Operation cancelled by user");
    }
}
