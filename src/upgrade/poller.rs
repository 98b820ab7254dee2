//! Bounded polling of a remote upgrade record.

use std::time::Duration;

use anyhow::Result;
use tokio::time::Instant;
use tracing::{debug, info};

use super::types::{UpgradeRecord, UpgradeState};
use crate::api::UpgradeQuery;
use crate::error::OcupError;

/// Delay between two upgrade record queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Deadline used when `start + timeout` does not fit in an `Instant`.
const MAX_WAIT: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Waits for an upgrade record to reach a target state.
pub struct UpgradePoller<'a, Q: ?Sized> {
    query: &'a Q,
    interval: Duration,
}

impl<'a, Q: UpgradeQuery + ?Sized> UpgradePoller<'a, Q> {
    pub fn new(query: &'a Q) -> Self {
        Self {
            query,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Query the upgrade record until its state equals `target`.
    ///
    /// The deadline is fixed at entry, so the call returns a timeout after at
    /// least `timeout` and before `timeout + interval`. Query failures are
    /// returned as-is without retrying. A record that lands in `failed` or
    /// `cancelled` while waiting for another state ends the wait early.
    pub async fn wait_for_state(
        &self,
        cluster_id: &str,
        target: UpgradeState,
        timeout: Duration,
    ) -> Result<UpgradeRecord> {
        let start = Instant::now();
        let deadline = start
            .checked_add(timeout)
            .unwrap_or_else(|| start + MAX_WAIT);

        while Instant::now() < deadline {
            let record = self.query.describe(cluster_id).await?;
            debug!(
                "Upgrade of cluster {} is {} (waiting for {}, {}s elapsed)",
                cluster_id,
                record.state,
                target,
                start.elapsed().as_secs()
            );

            if record.state == target {
                info!("Upgrade of cluster {} reached state {}", cluster_id, target);
                return Ok(record);
            }

            if matches!(record.state, UpgradeState::Failed | UpgradeState::Cancelled) {
                return Err(OcupError::UpgradeTerminated {
                    cluster_id: cluster_id.to_string(),
                    state: record.state.to_string(),
                }
                .into());
            }

            tokio::time::sleep(self.interval).await;
        }

        Err(OcupError::Timeout {
            cluster_id: cluster_id.to_string(),
            state: target.to_string(),
            minutes: start.elapsed().as_secs() / 60,
        }
        .into())
    }
}
