//! Node pool version floor for hosted control planes.
//!
//! A node pool may trail its control plane by at most two Y-streams, and
//! never run below the oldest minor that hosted control planes support.

use std::fmt;

use super::filter::{installable_versions, upgrade_targets};
use super::types::{Version, VersionList};

/// Oldest `(major, minor)` supported for hosted control planes.
pub const LOWEST_HOSTED_VERSION: (u64, u64) = (4, 12);

/// Maximum number of Y-streams a node pool may trail its control plane.
const MAX_NODE_POOL_SKEW: u64 = 2;

/// Pre-release marker the server uses for "earliest build of a minor".
const EARLIEST_BUILD_SUFFIX: &str = "0.a";

/// Minimum version a node pool may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodePoolFloor {
    /// A specific GA release.
    Exact(Version),
    /// Any build of this minor line, pre-release builds included.
    AnyBuildOfMinor { major: u64, minor: u64 },
}

impl NodePoolFloor {
    /// GA version to use as the inclusive lower bound when filtering a catalog.
    pub fn lower_bound(&self) -> Version {
        match self {
            Self::Exact(v) => v.clone(),
            Self::AnyBuildOfMinor { major, minor } => Version::ga(*major, *minor, 0),
        }
    }

    /// Whether a node pool running `version` satisfies this floor.
    pub fn admits(&self, version: &Version) -> bool {
        match self {
            // A pre-release of the floor release is older than the release itself
            Self::Exact(floor) => version > floor || (version == floor && version.is_ga()),
            Self::AnyBuildOfMinor { major, minor } => {
                (version.major(), version.minor()) >= (*major, *minor)
            }
        }
    }
}

impl fmt::Display for NodePoolFloor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "{}", v.raw()),
            Self::AnyBuildOfMinor { major, minor } => {
                write!(f, "{major}.{minor}.0-{EARLIEST_BUILD_SUFFIX}")
            }
        }
    }
}

/// Minimum version a node pool may run under the given control plane.
///
/// Only the numeric minor of the control plane is used; any pre-release
/// suffix is ignored and the floor is always expressed as a GA version
/// unless it clamps to the oldest supported minor. Clamping applies to the
/// 4.x line only, so the floor never gets ahead of the control plane.
pub fn minimal_node_pool_version(control_plane: &Version) -> NodePoolFloor {
    let target_minor = control_plane.minor().saturating_sub(MAX_NODE_POOL_SKEW);

    // The oldest supported minor only bounds its own major line
    let (lowest_major, lowest_minor) = LOWEST_HOSTED_VERSION;
    if control_plane.major() != lowest_major || target_minor >= lowest_minor {
        NodePoolFloor::Exact(Version::ga(control_plane.major(), target_minor, 0))
    } else {
        NodePoolFloor::AnyBuildOfMinor {
            major: lowest_major,
            minor: lowest_minor,
        }
    }
}

/// Versions a node pool may run under `control_plane`.
///
/// With no `current` version the pool is being created and the floor itself
/// is offered. Otherwise the pool's own version is excluded, unless it is
/// already below the floor.
pub fn node_pool_versions(
    catalog: &VersionList,
    control_plane: &Version,
    current: Option<&Version>,
) -> VersionList {
    let floor = minimal_node_pool_version(control_plane).lower_bound();

    match current {
        Some(current) if *current >= floor => upgrade_targets(catalog, current, control_plane),
        _ => installable_versions(catalog, &floor, control_plane),
    }
}
