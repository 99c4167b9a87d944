//! Version selector classification.

use std::fmt;

/// Length of a full git commit hash.
pub const COMMIT_HASH_LEN: usize = 40;

/// How a version selector is resolved.
///
/// Classification checks, in order: commit hash (exactly 40 characters),
/// `latest`/`unstable`, `stable`, and finally a semver range.
///
/// # Examples
///
/// ```
/// use mongodb_download_url::selector::VersionSelector;
///
/// assert_eq!(VersionSelector::parse("unstable"), VersionSelector::Latest);
/// assert_eq!(VersionSelector::parse("stable"), VersionSelector::Stable);
/// assert!(matches!(VersionSelector::parse("^4.0.0"), VersionSelector::Range(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector<'a> {
    /// A commit hash resolved through the CI revision API.
    Commit(&'a str),
    /// The newest published version.
    Latest,
    /// The newest stable (even minor, no prerelease) version.
    Stable,
    /// A semver range matched against the release catalog.
    Range(&'a str),
}

impl<'a> VersionSelector<'a> {
    /// Classify `selector`.
    ///
    /// Only the character count decides whether a selector is a commit
    /// hash; its contents are not validated.
    #[must_use]
    pub fn parse(selector: &'a str) -> Self {
        if selector.chars().count() == COMMIT_HASH_LEN {
            return Self::Commit(selector);
        }
        match selector {
            "latest" | "unstable" => Self::Latest,
            "stable" => Self::Stable,
            range => Self::Range(range),
        }
    }
}

impl fmt::Display for VersionSelector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Commit(commit) => write!(f, "commit {commit}"),
            Self::Latest => f.write_str("latest"),
            Self::Stable => f.write_str("stable"),
            Self::Range(range) => write!(f, "range {range}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const HASH: &str = "0123456789abcdef0123456789abcdef01234567";

    #[test]
    fn forty_characters_is_a_commit() {
        assert_eq!(HASH.len(), COMMIT_HASH_LEN);
        assert_eq!(VersionSelector::parse(HASH), VersionSelector::Commit(HASH));
    }

    #[rstest]
    #[case::thirty_nine("0123456789abcdef0123456789abcdef0123456")]
    #[case::forty_one("0123456789abcdef0123456789abcdef012345678")]
    fn other_lengths_are_never_commits(#[case] selector: &str) {
        assert!(!matches!(
            VersionSelector::parse(selector),
            VersionSelector::Commit(_)
        ));
    }

    #[test]
    fn forty_non_hex_characters_still_route_to_ci() {
        let selector = "x".repeat(COMMIT_HASH_LEN);
        assert!(matches!(
            VersionSelector::parse(&selector),
            VersionSelector::Commit(_)
        ));
    }

    #[rstest]
    #[case("latest", VersionSelector::Latest)]
    #[case("unstable", VersionSelector::Latest)]
    #[case("stable", VersionSelector::Stable)]
    #[case("3.0.7", VersionSelector::Range("3.0.7"))]
    #[case(">=3.6 <4", VersionSelector::Range(">=3.6 <4"))]
    fn sentinels_and_ranges(#[case] input: &str, #[case] expected: VersionSelector<'static>) {
        assert_eq!(VersionSelector::parse(input), expected);
    }
}
