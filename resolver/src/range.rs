//! npm-style version ranges over the `semver` crate.
//!
//! Release requests use the range grammar of the npm ecosystem: whitespace
//! separated comparators, `||` alternatives, hyphen ranges, and bare
//! versions meaning an exact match. `semver::VersionReq` speaks Cargo's
//! dialect (comma separated, bare versions meaning caret), so each
//! alternative is rewritten into that dialect before parsing.

use semver::{Version, VersionReq};
use std::fmt;

/// Characters that may make up a comparator operator.
const OPERATOR_CHARS: &[char] = &['<', '>', '=', '~', '^'];

/// Error raised when a range cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version range \"{range}\": {reason}")]
pub struct RangeError {
    /// The rejected range.
    pub range: String,
    /// Description of the parse failure.
    pub reason: String,
}

/// A parsed npm-style range: a union of Cargo requirements.
///
/// # Examples
///
/// ```
/// use mongodb_download_url::range::{NpmRange, parse_version};
///
/// let range = NpmRange::parse("^4.0.0").expect("valid range");
/// assert!(range.matches(&parse_version("4.2.1").expect("valid version")));
/// assert!(!range.matches(&parse_version("5.0.0").expect("valid version")));
///
/// let exact = NpmRange::parse("3.0.7").expect("valid range");
/// assert!(!exact.matches(&parse_version("3.0.8").expect("valid version")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmRange {
    source: String,
    alternatives: Vec<VersionReq>,
}

impl NpmRange {
    /// Parse an npm-style range.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError`] when any alternative fails to parse.
    pub fn parse(range: &str) -> Result<Self, RangeError> {
        let alternatives = range
            .split("||")
            .map(|alternative| {
                let translated = translate_alternative(alternative);
                VersionReq::parse(&translated).map_err(|e| RangeError {
                    range: range.to_owned(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            source: range.to_owned(),
            alternatives,
        })
    }

    /// Whether `version` satisfies any alternative.
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }
}

impl fmt::Display for NpmRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parse a published version string, tolerating a leading `v`.
///
/// Returns `None` for strings that are not semantic versions; such catalog
/// entries never satisfy a range.
#[must_use]
pub fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(bare).ok()
}

/// Rewrite one `||` alternative into Cargo requirement syntax.
fn translate_alternative(alternative: &str) -> String {
    let trimmed = alternative.trim();
    if let Some((low, high)) = trimmed.split_once(" - ") {
        let comparators = [
            translate_comparator(&format!(">={}", low.trim())),
            translate_comparator(&format!("<={}", high.trim())),
        ];
        return join_comparators(comparators.into_iter().flatten());
    }

    let mut comparators = Vec::new();
    let mut pending_operator = String::new();
    for token in trimmed.split_whitespace() {
        if token.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
            pending_operator.push_str(token);
            continue;
        }
        let joined = format!("{pending_operator}{token}");
        pending_operator.clear();
        comparators.extend(translate_comparator(&joined));
    }
    join_comparators(comparators.into_iter())
}

/// Rewrite a single comparator; `None` means "matches everything".
fn translate_comparator(comparator: &str) -> Option<String> {
    let version_start = comparator
        .find(|c: char| !OPERATOR_CHARS.contains(&c))
        .unwrap_or(comparator.len());
    let (operator, rest) = comparator.split_at(version_start);
    let rest = rest.trim_start_matches(['v', '=']);

    let components: Vec<&str> = rest.split('.').collect();
    let concrete: Vec<&str> = components
        .iter()
        .copied()
        .take_while(|part| !is_wildcard(part))
        .collect();
    let has_wildcard = concrete.len() < components.len();

    if concrete.is_empty() {
        return None;
    }
    let version = concrete.join(".");
    match (operator, has_wildcard) {
        ("", true) => Some(format!("{version}.*")),
        ("", false) => Some(format!("={version}")),
        (op, _) => Some(format!("{op}{version}")),
    }
}

fn is_wildcard(part: &str) -> bool {
    matches!(part, "*" | "x" | "X" | "")
}

fn join_comparators(comparators: impl Iterator<Item = String>) -> String {
    let joined = comparators.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "*".to_owned()
    } else {
        joined
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests fail fast with a message naming the broken fixture"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn version(raw: &str) -> Version {
        parse_version(raw).expect("test version")
    }

    #[rstest]
    #[case::caret("^4.0.0", "4.2.1", true)]
    #[case::caret_major_bound("^4.0.0", "5.0.0", false)]
    #[case::exact("3.0.7", "3.0.7", true)]
    #[case::exact_rejects_newer("3.0.7", "3.0.8", false)]
    #[case::partial_exact("3.0", "3.0.15", true)]
    #[case::partial_exact_bound("3.0", "3.1.0", false)]
    #[case::wildcard_patch("4.2.x", "4.2.9", true)]
    #[case::wildcard_minor("4.x", "4.4.0", true)]
    #[case::wildcard_rejects("4.x", "5.0.0", false)]
    #[case::star("*", "2.6.12", true)]
    #[case::empty("", "2.6.12", true)]
    #[case::space_separated(">=3.6 <4", "3.6.23", true)]
    #[case::space_separated_upper(">=3.6 <4", "4.0.0", false)]
    #[case::detached_operator(">= 3.2.0", "3.2.1", true)]
    #[case::tilde("~3.2.1", "3.2.9", true)]
    #[case::tilde_bound("~3.2.1", "3.3.0", false)]
    #[case::hyphen("3.0.0 - 3.2.0", "3.2.0", true)]
    #[case::hyphen_upper("3.0.0 - 3.2.0", "3.2.1", false)]
    #[case::or("2.6.x || 3.0.x", "3.0.4", true)]
    #[case::or_miss("2.6.x || 3.0.x", "3.2.0", false)]
    #[case::v_prefix("v3.0.7", "3.0.7", true)]
    fn npm_ranges(#[case] range: &str, #[case] candidate: &str, #[case] expected: bool) {
        let parsed = NpmRange::parse(range).expect("valid range");
        assert_eq!(
            parsed.matches(&version(candidate)),
            expected,
            "range {range} vs {candidate}"
        );
    }

    #[test]
    fn prereleases_need_an_explicit_prerelease_comparator() {
        let range = NpmRange::parse(">=3.0.0").expect("valid range");
        assert!(!range.matches(&version("3.1.0-rc0")));
    }

    #[rstest]
    #[case("not-a-version")]
    #[case(">=banana")]
    fn rejects_garbage(#[case] range: &str) {
        let err = NpmRange::parse(range).expect_err("invalid range");
        assert_eq!(err.range, range);
    }

    #[rstest]
    #[case("3.0.7", true)]
    #[case("v3.0.7", true)]
    #[case("2.6.0-rc2", true)]
    #[case("r3.0.7", false)]
    #[case("3.0", false)]
    fn parse_version_accepts_semver_only(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(parse_version(raw).is_some(), ok);
    }

    #[test]
    fn display_shows_source_text() {
        let range = NpmRange::parse(">=3.6 <4").expect("valid range");
        assert_eq!(range.to_string(), ">=3.6 <4");
    }
}
