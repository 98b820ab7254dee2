//! Y-stream (minor version) upgrade resolution.

use std::fmt;

use super::types::{SortOrder, Version, VersionList};

/// Kind of upgrade between two versions of the same major line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Minor version upgrade, e.g. 4.12 -> 4.13.
    Y,
    /// Patch upgrade within the same minor, e.g. 4.12.3 -> 4.12.4.
    Z,
}

impl Stream {
    /// Classify an upgrade from `current` to `target`.
    pub fn classify(current: &Version, target: &Version) -> Self {
        if target.major() == current.major() && target.minor() > current.minor() {
            Self::Y
        } else {
            Self::Z
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Y => f.write_str("Y-stream"),
            Self::Z => f.write_str("Z-stream"),
        }
    }
}

/// GA versions on the same major line with a strictly greater minor than
/// `current`, stable-sorted in the requested order.
///
/// Cross-major candidates never qualify.
pub fn find_y_stream_targets(
    catalog: &VersionList,
    current: &Version,
    order: SortOrder,
) -> VersionList {
    catalog
        .retain_by(|v| {
            v.is_ga() && v.major() == current.major() && v.minor() > current.minor()
        })
        .sorted(order)
}

/// Oldest qualifying Y-stream target.
pub fn lowest_y_stream_target(catalog: &VersionList, current: &Version) -> Option<Version> {
    find_y_stream_targets(catalog, current, SortOrder::Ascending)
        .into_iter()
        .next()
}

/// Newest qualifying Y-stream target.
pub fn highest_y_stream_target(catalog: &VersionList, current: &Version) -> Option<Version> {
    find_y_stream_targets(catalog, current, SortOrder::Descending)
        .into_iter()
        .next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::catalog;

    fn v(raw: &str) -> Version {
        Version::parse(raw).unwrap()
    }

    fn stable_catalog() -> VersionList {
        catalog::parse([
            "4.13.4",
            "4.12.9",
            "4.13.0-rc.3",
            "4.14.1",
            "4.13.0",
            "4.12.10",
            "4.14.0-0.nightly-2023-08-01-000000",
            "4.14.0",
            "5.0.0",
        ])
        .unwrap()
    }

    #[test]
    fn test_ascending_targets() {
        let targets = find_y_stream_targets(&stable_catalog(), &v("4.12.9"), SortOrder::Ascending);
        assert_eq!(targets.raws(), vec!["4.13.0", "4.13.4", "4.14.0", "4.14.1"]);
    }

    #[test]
    fn test_descending_targets() {
        let targets =
            find_y_stream_targets(&stable_catalog(), &v("4.12.9"), SortOrder::Descending);
        assert_eq!(targets.raws(), vec!["4.14.1", "4.14.0", "4.13.4", "4.13.0"]);
    }

    #[test]
    fn test_never_returns_same_or_lower_minor() {
        let current = v("4.13.0");
        let targets = find_y_stream_targets(&stable_catalog(), &current, SortOrder::default());
        assert!(targets.iter().all(|t| t.minor() > current.minor()));
        assert_eq!(targets.raws(), vec!["4.14.0", "4.14.1"]);
    }

    #[test]
    fn test_patch_only_increase_does_not_qualify() {
        let catalog = catalog::parse(["4.12.10", "4.12.11"]).unwrap();
        let targets = find_y_stream_targets(&catalog, &v("4.12.9"), SortOrder::Ascending);
        assert!(targets.is_empty());
    }

    #[test]
    fn test_cross_major_excluded() {
        let targets = find_y_stream_targets(&stable_catalog(), &v("4.14.1"), SortOrder::Ascending);
        assert!(targets.is_empty());
    }

    #[test]
    fn test_nightly_current_uses_numeric_minor() {
        let current = v("4.13.0-0.nightly-2023-05-01-000000");
        let lowest = lowest_y_stream_target(&stable_catalog(), &current).unwrap();
        assert_eq!(lowest.raw(), "4.14.0");
    }

    #[test]
    fn test_lowest_and_highest() {
        let catalog = stable_catalog();
        let current = v("4.12.10");
        assert_eq!(
            lowest_y_stream_target(&catalog, &current).map(|t| t.raw().to_string()),
            Some("4.13.0".to_string())
        );
        assert_eq!(
            highest_y_stream_target(&catalog, &current).map(|t| t.raw().to_string()),
            Some("4.14.1".to_string())
        );
        assert!(highest_y_stream_target(&catalog, &v("4.14.0")).is_none());
    }

    #[test]
    fn test_stream_classify() {
        assert_eq!(Stream::classify(&v("4.12.3"), &v("4.13.0")), Stream::Y);
        assert_eq!(Stream::classify(&v("4.12.3"), &v("4.12.4")), Stream::Z);
        assert_eq!(Stream::Y.to_string(), "Y-stream");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let catalog = stable_catalog();
        let current = v("4.12.9");
        let first = find_y_stream_targets(&catalog, &current, SortOrder::Descending);
        let second = find_y_stream_targets(&catalog, &current, SortOrder::Descending);
        assert_eq!(first.raws(), second.raws());
    }
}
