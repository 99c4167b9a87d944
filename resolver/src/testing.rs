//! In-memory providers for tests.
//!
//! Available to this crate's unit tests and, through the `test-support`
//! feature, to external suites.

use crate::catalog::{VersionCatalog, VersionList};
use crate::http::FetchError;
use crate::revision::{BuildManifest, RevisionLookup};
use std::collections::HashMap;

/// A catalog returning a fixed list, or a fixed failure.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    versions: Option<Vec<String>>,
}

impl StaticCatalog {
    /// Serve `versions` in the given (newest-first) order.
    #[must_use]
    pub fn new<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            versions: Some(versions.into_iter().map(Into::into).collect()),
        }
    }

    /// A catalog whose every fetch fails.
    #[must_use]
    pub fn unreachable() -> Self {
        Self { versions: None }
    }
}

impl VersionCatalog for StaticCatalog {
    fn versions(&self) -> Result<VersionList, FetchError> {
        self.versions
            .clone()
            .map(VersionList::newest_first)
            .ok_or_else(|| FetchError::Http {
                url: "static://catalog".to_owned(),
                reason: "catalog unreachable".to_owned(),
            })
    }
}

/// CI revisions keyed by `(branch, commit)`.
#[derive(Debug, Clone, Default)]
pub struct StaticRevisions {
    manifests: HashMap<(String, String), BuildManifest>,
}

impl StaticRevisions {
    /// Create an empty lookup; every revision is unknown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the builds of `commit` on `branch`.
    #[must_use]
    pub fn with_revision<I, S>(mut self, branch: &str, commit: &str, builds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manifests.insert(
            (branch.to_owned(), commit.to_owned()),
            BuildManifest::new(builds.into_iter().map(Into::into).collect()),
        );
        self
    }
}

impl RevisionLookup for StaticRevisions {
    fn revision(&self, branch: &str, commit: &str) -> Result<BuildManifest, FetchError> {
        self.manifests
            .get(&(branch.to_owned(), commit.to_owned()))
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                url: format!("static://{branch}/{commit}"),
                message: format!("revision {commit} not found on {branch}"),
            })
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests fail fast with a message naming the broken fixture"
)]
mod tests {
    use super::*;

    #[test]
    fn static_catalog_preserves_order() {
        let catalog = StaticCatalog::new(["1.0.0", "2.0.0"]);
        let list = catalog.versions().expect("static list");
        assert_eq!(list.first(), Some("1.0.0"));
    }

    #[test]
    fn unreachable_catalog_fails() {
        assert!(StaticCatalog::unreachable().versions().is_err());
    }

    #[test]
    fn static_revisions_report_unknown_commits() {
        let revisions = StaticRevisions::new().with_revision("master", "abc", ["build"]);
        assert!(revisions.revision("master", "abc").is_ok());
        let err = revisions.revision("v3.0", "abc").expect_err("unknown branch");
        assert_eq!(err.to_string(), "revision abc not found on v3.0");
    }
}
