//! Parsing raw version strings into a version catalog.

use tracing::debug;

use super::types::{Version, VersionList};
use crate::error::OcupError;

/// Parse raw version strings as returned by the version source.
///
/// Input order is preserved. Fails on the first string that is not
/// `major.minor.patch[-suffix]`.
pub fn parse<I, S>(raw_versions: I) -> Result<VersionList, OcupError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let versions = raw_versions
        .into_iter()
        .map(|raw| Version::parse(raw.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let unstable = versions.iter().filter(|v| !v.is_ga()).count();
    debug!(
        "Parsed {} versions ({} unstable)",
        versions.len(),
        unstable
    );

    Ok(VersionList::new(versions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::types::Stability;

    #[test]
    fn test_parse_preserves_order_and_tags() {
        let list = parse([
            "4.12.3",
            "4.12.0-rc.8",
            "4.13.0-0.nightly-2023-02-22-192922",
            "4.12.1",
        ])
        .unwrap();

        assert_eq!(
            list.raws(),
            vec![
                "4.12.3",
                "4.12.0-rc.8",
                "4.13.0-0.nightly-2023-02-22-192922",
                "4.12.1"
            ]
        );
        let tags: Vec<Stability> = list.iter().map(|v| v.stability()).collect();
        assert_eq!(
            tags,
            vec![
                Stability::Ga,
                Stability::ReleaseCandidate,
                Stability::Nightly,
                Stability::Ga
            ]
        );
    }

    #[test]
    fn test_parse_owned_strings() {
        let raw: Vec<String> = vec!["4.14.1".to_string(), "4.14.2".to_string()];
        let list = parse(&raw).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_parse_empty() {
        let list = parse(Vec::<String>::new()).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let err = parse(["4.12.1", "latest"]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid version format: latest");
    }
}
