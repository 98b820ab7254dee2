//! Table formatting for CLI output.
//!
//! Renders version catalogs, upgrade plans and upgrade records as
//! kubectl-style tables.

use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::upgrade::plan::{DEFAULT_CHANNEL_GROUP, UpgradePlan};
use crate::upgrade::types::{UpgradeRecord, UpgradeState, format_next_run};
use crate::version::hosted::NodePoolFloor;
use crate::version::types::{Version, VersionList};
use crate::version::ystream::Stream;

/// Row for version listings.
#[derive(Tabled)]
struct VersionRow {
    #[tabled(rename = "VERSION")]
    version: String,
    #[tabled(rename = "STABILITY")]
    stability: String,
    #[tabled(rename = "STREAM")]
    stream: String,
    #[tabled(rename = "STEPS")]
    steps: String,
}

/// Row for the upgrade record table.
#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "CLUSTER")]
    cluster: String,
    #[tabled(rename = "STATE")]
    state: String,
    #[tabled(rename = "VERSION")]
    version: String,
    #[tabled(rename = "NEXT RUN")]
    next_run: String,
    #[tabled(rename = "POLICY")]
    policy: String,
}

fn version_rows(versions: &VersionList, current: Option<&Version>) -> Vec<VersionRow> {
    versions
        .iter()
        .map(|v| {
            let (stream, steps) = match current {
                Some(current) => {
                    let steps = current.minor_steps_to(v);
                    let step_word = if steps == 1 { "step" } else { "steps" };
                    (
                        Stream::classify(current, v).to_string(),
                        format!("+{} {}", steps, step_word),
                    )
                }
                None => ("-".to_string(), "-".to_string()),
            };

            VersionRow {
                version: v.raw().to_string(),
                stability: v.stability().to_string(),
                stream,
                steps,
            }
        })
        .collect()
}

fn record_row(record: &UpgradeRecord) -> RecordRow {
    RecordRow {
        cluster: record.cluster_id.clone(),
        state: record.state.to_string(),
        version: record.version.clone().unwrap_or_else(|| "-".to_string()),
        next_run: record
            .next_run_time
            .as_ref()
            .map(format_next_run)
            .unwrap_or_else(|| "-".to_string()),
        policy: record.policy_id.clone().unwrap_or_else(|| "-".to_string()),
    }
}

/// Print a version table. Stream and step columns are relative to `current`.
pub fn print_versions(title: &str, versions: &VersionList, current: Option<&Version>) {
    println!("{} ({} versions):", title.bold(), versions.len());

    if versions.is_empty() {
        println!("  No versions found.");
        return;
    }

    let mut table = Table::new(version_rows(versions, current));
    apply_table_style(&mut table);
    println!("{}", table);
}

/// Print the resolved upgrade plan.
pub fn print_upgrade_plan(plan: &UpgradePlan) {
    println!(
        "{}",
        format!(
            "Upgrade Plan: {} ({} -> {})",
            plan.cluster.name, plan.current_version, plan.target_version
        )
        .bold()
    );
    println!("{}", "=".repeat(60));

    let scope = if plan.request.control_plane_only {
        "control plane only (hosted)"
    } else {
        "cluster (classic)"
    };
    let steps = plan.current_version.minor_steps_to(&plan.target_version);

    println!("  Cluster ID:    {}", plan.cluster.id);
    println!("  Scope:         {}", scope);
    println!(
        "  Stream:        {} (+{} minor)",
        plan.stream.to_string().cyan(),
        steps
    );
    println!(
        "  Channel:       {}",
        format!(
            "{}-{}",
            plan.cluster
                .channel_group
                .as_deref()
                .unwrap_or(DEFAULT_CHANNEL_GROUP),
            plan.target_version.major_minor()
        )
    );
    println!(
        "  Scheduled at:  {}",
        format_next_run(&plan.request.schedule_time)
    );

    if plan.stream == Stream::Y {
        println!(
            "  {}",
            "Y-stream upgrades may require administrator acknowledgement of API removals."
                .yellow()
        );
    }
}

/// Print an upgrade record.
pub fn print_upgrade_record(record: &UpgradeRecord) {
    let mut row = record_row(record);
    row.state = colorize_state(record.state);

    let mut table = Table::new([row]);
    apply_table_style(&mut table);
    println!("{}", table);
}

/// Print the node pool floor and the versions allowed under a control plane.
pub fn print_node_pool_versions(
    control_plane: &Version,
    floor: &NodePoolFloor,
    versions: &VersionList,
    current: Option<&Version>,
) {
    println!(
        "Control plane: {}, minimal node pool version: {}",
        control_plane.raw().bold(),
        floor.to_string().bold()
    );
    if let Some(current) = current
        && !floor.admits(current)
    {
        println!(
            "{}",
            format!("Node pool version {} is below the supported floor.", current)
                .red()
                .bold()
        );
    }
    println!();
    print_versions("Node pool versions", versions, current);
}

fn colorize_state(state: UpgradeState) -> String {
    match state {
        UpgradeState::Completed => state.to_string().green().to_string(),
        UpgradeState::Scheduled | UpgradeState::Started => state.to_string().cyan().to_string(),
        UpgradeState::Cancelled | UpgradeState::Failed => state.to_string().red().to_string(),
        UpgradeState::NotScheduled => state.to_string().dimmed().to_string(),
    }
}

fn apply_table_style(table: &mut Table) {
    use tabled::settings::object::Columns;
    use tabled::settings::themes::Theme;
    use tabled::settings::{Modify, Padding};

    let mut theme = Theme::from_style(Style::empty());
    theme.remove_horizontal_lines();
    table.with(theme);
    table.with(Modify::new(Columns::new(..)).with(Padding::new(0, 2, 0, 0)));
}
