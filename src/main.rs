//! ocup - Managed OpenShift cluster upgrade support CLI tool.
//!
//! Command line tool for OpenShift Cluster Manager clusters with:
//! - Version catalog listing and range filtering
//! - Y-stream and Z-stream upgrade target resolution
//! - Upgrade scheduling with bounded waits on the upgrade record
//! - Node pool version floors for hosted control planes

mod api;
mod config;
mod error;
mod ocm;
mod output;
mod upgrade;
mod version;

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error};

use api::{ClusterSource, UpgradeQuery, VersionSource};
use config::{Args, Command, Config, UpgradeArgs};
use error::OcupError;
use ocm::client::OcmClient;
use output::{print_node_pool_versions, print_upgrade_plan, print_upgrade_record, print_versions};
use upgrade::plan::{self, DEFAULT_CHANNEL_GROUP};
use upgrade::poller::UpgradePoller;
use upgrade::types::UpgradeState;
use version::catalog;
use version::filter::installable_versions;
use version::hosted::{minimal_node_pool_version, node_pool_versions};
use version::types::{SortOrder, Version};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = Config::from_args(args);

    // Initialize logging
    if let Err(e) = init_tracing(&config.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    debug!("Starting ocup - OpenShift Upgrade Support Tool");

    if let Err(e) = run(config).await {
        error!("{}", e);
        // Timeouts leave the upgrade pending rather than failed
        let timed_out = e
            .downcast_ref::<OcupError>()
            .is_some_and(OcupError::is_timeout);
        if timed_out {
            eprintln!(
                "{}",
                "Upgrade is still pending. Check it later with 'ocup describe-upgrade'.".yellow()
            );
            std::process::exit(2);
        }
        std::process::exit(1);
    }
}

/// Main application logic.
async fn run(config: Config) -> Result<()> {
    let token = config
        .token
        .ok_or_else(|| anyhow::anyhow!("--token or OCM_TOKEN is required"))?;
    let client = OcmClient::new(&config.url, token)?;

    match &config.command {
        Command::Versions {
            channel_group,
            min,
            max,
        } => run_versions(&client, channel_group, min.as_ref(), max.as_ref()).await,
        Command::ListUpgrades {
            cluster,
            channel_group,
        } => run_list_upgrades(&client, cluster, channel_group.as_deref()).await,
        Command::Upgrade(args) => run_upgrade(&client, args, config.dry_run, config.yes).await,
        Command::DescribeUpgrade { cluster } => {
            let record = client.describe(cluster).await?;
            print_upgrade_record(&record);
            Ok(())
        }
        Command::Wait {
            cluster,
            state,
            timeout,
            interval,
        } => run_wait(&client, cluster, *state, *timeout, *interval).await,
        Command::NodePoolVersions {
            cluster,
            current,
            channel_group,
        } => {
            run_node_pool_versions(&client, cluster, current.as_ref(), channel_group.as_deref())
                .await
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(log_level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to initialize log filter: {}", e))?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}

/// List a channel group, optionally narrowed to an installable range.
async fn run_versions(
    client: &OcmClient,
    channel_group: &str,
    min: Option<&Version>,
    max: Option<&Version>,
) -> Result<()> {
    let raw_versions = client.list_versions(channel_group).await?;
    let versions = catalog::parse(&raw_versions)?.sorted(SortOrder::Ascending);

    if min.is_none() && max.is_none() {
        print_versions(&format!("Versions in {}", channel_group), &versions, None);
        return Ok(());
    }

    let min = match (min, versions.first()) {
        (Some(min), _) => min.clone(),
        (None, Some(lowest)) => lowest.clone(),
        (None, None) => {
            println!("No versions found in {}.", channel_group);
            return Ok(());
        }
    };
    let max = max
        .or(versions.highest_ga())
        .cloned()
        .unwrap_or_else(|| min.clone());

    let installable = installable_versions(&versions, &min, &max);
    print_versions(
        &format!("Installable versions in {} ({} - {})", channel_group, min, max),
        &installable,
        None,
    );

    Ok(())
}

/// List every available upgrade of a cluster.
async fn run_list_upgrades(
    client: &OcmClient,
    cluster_id: &str,
    channel_group: Option<&str>,
) -> Result<()> {
    let versions = plan::load_cluster_versions(client, cluster_id, channel_group).await?;
    println!("Cluster: {}", versions.cluster.to_string().bold());
    println!();

    print_versions(
        "Available upgrades",
        &versions.available_upgrades(),
        Some(&versions.current),
    );

    Ok(())
}

/// Resolve, confirm and schedule an upgrade.
async fn run_upgrade(
    client: &OcmClient,
    args: &UpgradeArgs,
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    let schedule_time = Utc::now() + chrono::Duration::minutes(args.schedule_in);

    let plan = plan::create_upgrade_plan(
        client,
        &args.cluster,
        args.channel_group.as_deref(),
        &args.selection(),
        schedule_time,
    )
    .await?;

    print_upgrade_plan(&plan);
    println!();

    if dry_run {
        println!("{}", "[DRY RUN] Upgrade plan generated.".yellow());
        return Ok(());
    }

    if !yes
        && !Confirm::new()
            .with_prompt(format!(
                "Schedule upgrade of {} to {}?",
                plan.cluster.name, plan.target_version
            ))
            .default(false)
            .interact()?
    {
        return Err(OcupError::UserCancelled.into());
    }

    let config = args.upgrade_config();
    let target = if config.wait_for_start {
        UpgradeState::Started
    } else {
        UpgradeState::Scheduled
    };

    let spinner = create_spinner(&format!(
        "Waiting for upgrade of {} to be {}...",
        plan.cluster.name, target
    ))?;
    let result = plan::execute_upgrade(client, &plan, &config).await;
    spinner.finish_and_clear();

    let record = result?;
    println!(
        "{}",
        format!(
            "Upgrade scheduled: {} -> {}",
            plan.current_version, plan.target_version
        )
        .green()
        .bold()
    );
    print_upgrade_record(&record);

    Ok(())
}

/// Wait for an upgrade record to reach a state.
async fn run_wait(
    client: &OcmClient,
    cluster_id: &str,
    state: UpgradeState,
    timeout_minutes: u64,
    interval_seconds: u64,
) -> Result<()> {
    let poller = UpgradePoller::new(client).with_interval(Duration::from_secs(interval_seconds));

    let spinner = create_spinner(&format!(
        "Waiting up to {} minutes for upgrade of {} to be {}...",
        timeout_minutes, cluster_id, state
    ))?;
    let timeout = Duration::from_secs(timeout_minutes.saturating_mul(60));
    let result = poller.wait_for_state(cluster_id, state, timeout).await;
    spinner.finish_and_clear();

    print_upgrade_record(&result?);
    Ok(())
}

/// Show the node pool floor and allowed node pool versions of a hosted cluster.
async fn run_node_pool_versions(
    client: &OcmClient,
    cluster_id: &str,
    current: Option<&Version>,
    channel_group: Option<&str>,
) -> Result<()> {
    let cluster = client.describe_cluster(cluster_id).await?;
    if !cluster.hosted {
        return Err(OcupError::UpgradeNotPossible(format!(
            "cluster {} does not have a hosted control plane",
            cluster.id
        ))
        .into());
    }

    let control_plane = Version::parse(&cluster.version)?;

    let channel_group = channel_group
        .or(cluster.channel_group.as_deref())
        .unwrap_or(DEFAULT_CHANNEL_GROUP);
    let raw_versions = client.list_versions(channel_group).await?;
    let versions = catalog::parse(&raw_versions)?.sorted(SortOrder::Ascending);

    let floor = minimal_node_pool_version(&control_plane);
    let allowed = node_pool_versions(&versions, &control_plane, current);

    print_node_pool_versions(&control_plane, &floor, &allowed, current);
    Ok(())
}

/// Create a spinner for long-running waits.
fn create_spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.cyan} [{elapsed_precise}] {msg}")?,
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    Ok(spinner)
}
