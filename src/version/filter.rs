//! Bounded filtering of a version catalog.

use super::types::{Version, VersionList};

/// Whether the lower bound itself is part of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LowerBound {
    Inclusive,
    Exclusive,
}

/// Keep GA versions with `min <= v <= max`, dropping `v == min` when the
/// lower bound is exclusive. Catalog order is preserved.
///
/// An inverted range yields an empty list.
pub fn filter(
    catalog: &VersionList,
    min: &Version,
    max: &Version,
    lower_bound: LowerBound,
) -> VersionList {
    if min > max {
        return VersionList::default();
    }

    catalog.retain_by(|v| {
        v.is_ga()
            && v >= min
            && v <= max
            && !(lower_bound == LowerBound::Exclusive && v == min)
    })
}

/// Versions a resource that does not exist yet may be created with.
/// The floor itself is a valid choice.
pub fn installable_versions(catalog: &VersionList, min: &Version, max: &Version) -> VersionList {
    filter(catalog, min, max, LowerBound::Inclusive)
}

/// Versions a resource running `current` may be upgraded to.
pub fn upgrade_targets(catalog: &VersionList, current: &Version, max: &Version) -> VersionList {
    filter(catalog, current, max, LowerBound::Exclusive)
}
