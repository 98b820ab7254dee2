//! Structured, comparable version values.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::OcupError;

/// Build stability derived from the pre-release suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stability {
    Ga,
    ReleaseCandidate,
    Nightly,
}

impl Stability {
    fn from_pre_release(pre: &str) -> Self {
        if pre.is_empty() {
            Self::Ga
        } else if pre.contains("nightly") {
            Self::Nightly
        } else {
            Self::ReleaseCandidate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ga => "GA",
            Self::ReleaseCandidate => "RC",
            Self::Nightly => "nightly",
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable cluster version.
///
/// Ordering, equality and hashing use `(major, minor, patch)` only. The
/// stability tag is for filtering, and `raw` is kept verbatim so that the
/// exact server string is what gets sent back when scheduling.
#[derive(Debug, Clone)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    stability: Stability,
    raw: String,
}

impl Version {
    /// Parse a `major.minor.patch[-suffix]` string.
    pub fn parse(raw: &str) -> Result<Self, OcupError> {
        let parsed =
            semver::Version::parse(raw).map_err(|_| OcupError::MalformedVersion(raw.to_string()))?;

        Ok(Self {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            stability: Stability::from_pre_release(parsed.pre.as_str()),
            raw: raw.to_string(),
        })
    }

    /// Build a clean GA version from its numeric components.
    pub fn ga(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            stability: Stability::Ga,
            raw: format!("{major}.{minor}.{patch}"),
        }
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn stability(&self) -> Stability {
        self.stability
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_ga(&self) -> bool {
        self.stability == Stability::Ga
    }

    fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }

    /// Returns the `major.minor` line, e.g. `4.13` for `4.13.2`.
    pub fn major_minor(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// Number of Y-streams between two versions of the same major line.
    /// Returns 0 across major lines.
    pub fn minor_steps_to(&self, target: &Version) -> u64 {
        if self.major != target.major {
            return 0;
        }
        target.minor.abs_diff(self.minor)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.triple() == other.triple()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.triple().hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.triple().cmp(&other.triple())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Version {
    type Err = OcupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Sort direction for version lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// An ordered sequence of versions.
///
/// Order is the server-returned order until [`VersionList::sorted`] is used.
#[derive(Debug, Clone, Default)]
pub struct VersionList(Vec<Version>);

impl VersionList {
    pub fn new(versions: Vec<Version>) -> Self {
        Self(versions)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Version> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&Version> {
        self.0.first()
    }

    /// Raw strings in list order.
    pub fn raws(&self) -> Vec<&str> {
        self.0.iter().map(Version::raw).collect()
    }

    /// Stable sort by numeric tuple; equal tuples keep their relative order.
    pub fn sorted(&self, order: SortOrder) -> VersionList {
        let mut versions = self.0.clone();
        match order {
            SortOrder::Ascending => versions.sort_by(|a, b| a.cmp(b)),
            SortOrder::Descending => versions.sort_by(|a, b| b.cmp(a)),
        }
        Self(versions)
    }

    /// Stable filter, no re-sort.
    pub fn retain_by<F>(&self, mut keep: F) -> VersionList
    where
        F: FnMut(&Version) -> bool,
    {
        self.0.iter().filter(|v| keep(v)).cloned().collect()
    }

    /// Highest GA version in the list.
    pub fn highest_ga(&self) -> Option<&Version> {
        self.0.iter().filter(|v| v.is_ga()).max()
    }

    /// Look up a version by its exact server string.
    pub fn find_raw(&self, raw: &str) -> Option<&Version> {
        self.0.iter().find(|v| v.raw() == raw)
    }
}

impl FromIterator<Version> for VersionList {
    fn from_iter<I: IntoIterator<Item = Version>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for VersionList {
    type Item = Version;
    type IntoIter = std::vec::IntoIter<Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a VersionList {
    type Item = &'a Version;
    type IntoIter = std::slice::Iter<'a, Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: &str) -> Version {
        Version::parse(raw).unwrap()
    }

    #[test]
    fn test_parse_ga() {
        let version = v("4.12.5");
        assert_eq!(version.triple(), (4, 12, 5));
        assert_eq!(version.stability(), Stability::Ga);
        assert_eq!(version.raw(), "4.12.5");
    }

    #[test]
    fn test_parse_stability_tags() {
        assert_eq!(v("4.12.0-rc.8").stability(), Stability::ReleaseCandidate);
        assert_eq!(v("4.12.0-ec.2").stability(), Stability::ReleaseCandidate);
        assert_eq!(
            v("4.13.0-0.nightly-2023-02-22-192922").stability(),
            Stability::Nightly
        );
    }

    #[test]
    fn test_parse_malformed() {
        for raw in ["", "4", "4.12", "4.x.1", "v4.12.1", "4.12.1-"] {
            let err = Version::parse(raw).unwrap_err();
            assert!(matches!(err, OcupError::MalformedVersion(ref s) if s == raw));
        }
    }

    #[test]
    fn test_ordering_is_numeric() {
        assert!(v("4.9.0") < v("4.10.0"));
        assert!(v("4.12.10") > v("4.12.9"));
        assert!(v("5.0.0") > v("4.99.99"));
    }

    #[test]
    fn test_stability_ignored_in_comparison() {
        assert_eq!(v("4.12.0-rc.8"), v("4.12.0"));
        assert_eq!(v("4.12.0-rc.8").cmp(&v("4.12.0")), Ordering::Equal);
        assert_ne!(v("4.12.0-rc.8").raw(), v("4.12.0").raw());
    }

    #[test]
    fn test_ga_constructor() {
        let version = Version::ga(4, 13, 0);
        assert_eq!(version.raw(), "4.13.0");
        assert!(version.is_ga());
        assert_eq!(version, v("4.13.0"));
    }

    #[test]
    fn test_major_minor() {
        assert_eq!(v("4.13.2").major_minor(), "4.13");
        assert_eq!(v("4.14.0-0.nightly-2023-02-27-084419").major_minor(), "4.14");
    }

    #[test]
    fn test_minor_steps_to() {
        assert_eq!(v("4.12.3").minor_steps_to(&v("4.13.0")), 1);
        assert_eq!(v("4.12.3").minor_steps_to(&v("4.15.1")), 3);
        assert_eq!(v("4.12.3").minor_steps_to(&v("4.12.9")), 0);
        assert_eq!(v("4.12.3").minor_steps_to(&v("5.0.0")), 0);
    }

    #[test]
    fn test_sorted_is_stable() {
        let list: VersionList = ["4.12.1", "4.12.0-rc.8", "4.11.0", "4.12.0"]
            .iter()
            .map(|s| v(s))
            .collect();

        let asc = list.sorted(SortOrder::Ascending);
        assert_eq!(asc.raws(), vec!["4.11.0", "4.12.0-rc.8", "4.12.0", "4.12.1"]);

        let desc = list.sorted(SortOrder::Descending);
        assert_eq!(desc.raws(), vec!["4.12.1", "4.12.0-rc.8", "4.12.0", "4.11.0"]);

        // Original list untouched
        assert_eq!(list.raws(), vec!["4.12.1", "4.12.0-rc.8", "4.11.0", "4.12.0"]);
    }

    #[test]
    fn test_highest_ga_and_find_raw() {
        let list: VersionList = ["4.12.1", "4.13.0-rc.1", "4.12.3"]
            .iter()
            .map(|s| v(s))
            .collect();
        assert_eq!(list.highest_ga().map(Version::raw), Some("4.12.3"));
        assert!(list.find_raw("4.13.0-rc.1").is_some());
        assert!(list.find_raw("4.13.0").is_none());
        assert!(VersionList::default().highest_ga().is_none());
    }
}
