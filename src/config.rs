//! CLI configuration and argument parsing.

use clap::{Args as ClapArgs, Parser, Subcommand};
use secrecy::SecretString;

use crate::ocm::client::DEFAULT_API_URL;
use crate::upgrade::plan::{TargetSelection, UpgradeConfig};
use crate::upgrade::types::UpgradeState;
use crate::version::types::Version;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const COMMIT: &str = env!("BUILD_COMMIT");
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Managed OpenShift cluster upgrade support CLI tool.
///
/// Resolves upgrade targets from the OpenShift Cluster Manager version catalog,
/// schedules control plane upgrades and waits for them to be picked up.
#[derive(Parser, Debug)]
#[command(name = "ocup")]
#[command(about = "Managed OpenShift cluster upgrade support CLI tool")]
#[command(version = const_format::formatcp!(
    "{} (commit: {}, build date: {})",
    VERSION, COMMIT, BUILD_DATE
))]
pub struct Args {
    /// OpenShift Cluster Manager API URL
    #[arg(long, global = true, env = "OCM_URL", default_value = DEFAULT_API_URL)]
    pub url: String,

    /// OCM access token
    #[arg(long, global = true, env = "OCM_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Show the upgrade plan without scheduling it
    #[arg(long, global = true, default_value = "false")]
    pub dry_run: bool,

    /// Skip confirmation prompts
    #[arg(short, long, global = true, default_value = "false")]
    pub yes: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn", env = "OCUP_LOG_LEVEL")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the versions of a channel group
    #[command(after_help = r#"Examples:
  ocup versions                              All versions in the stable channel
  ocup versions --min 4.12.0 --max 4.13.5    Installable GA versions in a range"#)]
    Versions {
        /// Channel group to list
        #[arg(long, default_value = "stable")]
        channel_group: String,

        /// Lowest installable version (inclusive)
        #[arg(long)]
        min: Option<Version>,

        /// Highest installable version (inclusive)
        #[arg(long)]
        max: Option<Version>,
    },

    /// List the available upgrades of a cluster
    ListUpgrades {
        /// Cluster ID
        #[arg(value_name = "CLUSTER")]
        cluster: String,

        /// Channel group [default: the cluster's channel group]
        #[arg(long)]
        channel_group: Option<String>,
    },

    /// Schedule a cluster upgrade
    #[command(after_help = r#"Examples:
  ocup upgrade <CLUSTER>                    Next minor version (lowest Y-stream)
  ocup upgrade <CLUSTER> --latest           Newest minor version
  ocup upgrade <CLUSTER> --z-stream         Newest patch of the current minor
  ocup upgrade <CLUSTER> --version 4.13.3   Explicit target"#)]
    Upgrade(UpgradeArgs),

    /// Show the upgrade record of a cluster
    DescribeUpgrade {
        /// Cluster ID
        #[arg(value_name = "CLUSTER")]
        cluster: String,
    },

    /// Wait for the upgrade of a cluster to reach a state
    Wait {
        /// Cluster ID
        #[arg(value_name = "CLUSTER")]
        cluster: String,

        /// Expected state (scheduled, started, completed, ...)
        #[arg(long, default_value = "scheduled")]
        state: UpgradeState,

        /// Timeout in minutes
        #[arg(long, default_value = "4")]
        timeout: u64,

        /// Poll interval in seconds
        #[arg(long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },

    /// List the node pool versions allowed by a hosted control plane
    NodePoolVersions {
        /// Cluster ID of the hosted cluster
        #[arg(value_name = "CLUSTER")]
        cluster: String,

        /// Current node pool version [default: none, list installable versions]
        #[arg(long)]
        current: Option<Version>,

        /// Channel group [default: the cluster's channel group]
        #[arg(long)]
        channel_group: Option<String>,
    },
}

/// Arguments of the `upgrade` subcommand.
#[derive(ClapArgs, Debug, Clone)]
pub struct UpgradeArgs {
    /// Cluster ID
    #[arg(value_name = "CLUSTER")]
    pub cluster: String,

    /// Target version
    #[arg(long, conflicts_with_all = ["latest", "z_stream"])]
    pub version: Option<String>,

    /// Upgrade to the newest minor version instead of the next one
    #[arg(long, default_value = "false", conflicts_with = "z_stream")]
    pub latest: bool,

    /// Upgrade to the newest patch of the current minor version
    #[arg(long, default_value = "false")]
    pub z_stream: bool,

    /// Channel group [default: the cluster's channel group]
    #[arg(long)]
    pub channel_group: Option<String>,

    /// Minutes from now to schedule the upgrade at
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(i64).range(1..))]
    pub schedule_in: i64,

    /// Also wait for the upgrade to start
    #[arg(long, default_value = "false")]
    pub wait_for_start: bool,

    /// Minutes to wait for the upgrade to be scheduled
    #[arg(long, default_value = "4")]
    pub scheduled_timeout: u64,

    /// Minutes to wait for the upgrade to start
    #[arg(long, default_value = "70")]
    pub started_timeout: u64,

    /// Poll interval in seconds
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,
}

impl UpgradeArgs {
    /// Target selection implied by the flags.
    pub fn selection(&self) -> TargetSelection {
        match (&self.version, self.latest, self.z_stream) {
            (Some(version), _, _) => TargetSelection::Explicit(version.clone()),
            (None, true, _) => TargetSelection::HighestYStream,
            (None, _, true) => TargetSelection::LatestZStream,
            (None, false, false) => TargetSelection::LowestYStream,
        }
    }

    pub fn upgrade_config(&self) -> UpgradeConfig {
        UpgradeConfig {
            wait_for_start: self.wait_for_start,
            scheduled_timeout_minutes: self.scheduled_timeout,
            started_timeout_minutes: self.started_timeout,
            check_interval_seconds: self.interval,
        }
    }
}

/// Application configuration derived from CLI args.
#[derive(Debug)]
pub struct Config {
    pub url: String,
    pub token: Option<SecretString>,
    pub dry_run: bool,
    pub yes: bool,
    pub log_level: String,
    pub command: Command,
}

impl Config {
    /// Create config from CLI arguments.
    pub fn from_args(args: Args) -> Self {
        Self {
            url: args.url,
            token: args.token.map(SecretString::from),
            dry_run: args.dry_run,
            yes: args.yes,
            log_level: args.log_level,
            command: args.command,
        }
    }
}
