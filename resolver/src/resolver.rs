//! Version resolution strategies.
//!
//! [`VersionResolver`] turns the selector carried by [`NormalizedOptions`]
//! into either a published version or a CI build reference. Catalog
//! strategies take the first qualifying entry in catalog order; the
//! catalog is never re-sorted here.

use crate::catalog::{VersionCatalog, VersionList};
use crate::error::{ResolveError, Result};
use crate::options::NormalizedOptions;
use crate::range::{NpmRange, parse_version};
use crate::revision::{BINARIES_PREFIX, RevisionLookup, build_fragment, ci_distro};
use crate::selector::VersionSelector;
use log::debug;

/// The outcome of version resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A version from the public release catalog.
    Release {
        /// The published version string.
        version: String,
    },
    /// A build of a specific commit from CI.
    Revision {
        /// The commit hash that was requested.
        commit: String,
        /// The distro CI built for.
        distro: String,
        /// Archive basename without extension (`binaries-<build>`).
        basename: String,
    },
}

impl Resolved {
    /// Return the version string reported for this resolution.
    #[must_use]
    pub fn version(&self) -> &str {
        match self {
            Self::Release { version } => version,
            Self::Revision { commit, .. } => commit,
        }
    }
}

/// Dispatches a selector to the matching strategy.
pub struct VersionResolver<'a> {
    catalog: &'a dyn VersionCatalog,
    revisions: &'a dyn RevisionLookup,
}

impl<'a> VersionResolver<'a> {
    /// Create a resolver over the given providers.
    #[must_use]
    pub fn new(catalog: &'a dyn VersionCatalog, revisions: &'a dyn RevisionLookup) -> Self {
        Self { catalog, revisions }
    }

    /// Resolve the selector in `options`.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::Upstream`] when a provider fails.
    /// - [`ResolveError::NotFound`] when no catalog entry qualifies,
    ///   including when the selector is not a valid range.
    /// - [`ResolveError::LookupMismatch`] when a CI manifest has no
    ///   matching build.
    pub fn resolve(&self, options: &NormalizedOptions) -> Result<Resolved> {
        let selector = VersionSelector::parse(options.version());
        debug!("resolving {selector}");
        match selector {
            VersionSelector::Commit(commit) => self.resolve_commit(options, commit),
            VersionSelector::Latest => {
                let versions = self.catalog.versions()?;
                release(latest(&versions), options)
            }
            VersionSelector::Stable => {
                let versions = self.catalog.versions()?;
                release(stable(&versions), options)
            }
            VersionSelector::Range(raw) => {
                let versions = self.catalog.versions()?;
                let found = match NpmRange::parse(raw) {
                    Ok(range) => search(&versions, &range),
                    Err(err) => {
                        debug!("{err}; no catalog entry can match");
                        None
                    }
                };
                release(found, options)
            }
        }
    }

    fn resolve_commit(&self, options: &NormalizedOptions, commit: &str) -> Result<Resolved> {
        let distro = ci_distro(options);
        let manifest = self.revisions.revision(options.branch(), commit)?;
        let fragment = build_fragment(options.branch(), &distro);
        let build = manifest
            .find_build(&fragment)
            .ok_or_else(|| ResolveError::LookupMismatch {
                commit: commit.to_owned(),
                fragment,
            })?;
        debug!("commit {commit} matched CI build {build}");
        Ok(Resolved::Revision {
            commit: commit.to_owned(),
            basename: format!("{BINARIES_PREFIX}{build}"),
            distro,
        })
    }
}

/// Return the newest catalog entry.
#[must_use]
pub fn latest(versions: &VersionList) -> Option<&str> {
    versions.first()
}

/// Return the newest entry with an even minor version and no prerelease.
///
/// # Examples
///
/// ```
/// use mongodb_download_url::catalog::VersionList;
/// use mongodb_download_url::resolver::stable;
///
/// let versions = VersionList::from(vec!["3.3.1", "3.2.0-rc1", "3.2.0", "3.0.7"]);
/// assert_eq!(stable(&versions), Some("3.2.0"));
/// ```
#[must_use]
pub fn stable(versions: &VersionList) -> Option<&str> {
    versions.iter().find(|raw| {
        parse_version(raw).is_some_and(|v| v.pre.is_empty() && v.minor % 2 == 0)
    })
}

/// Return the first catalog entry satisfying `range`.
#[must_use]
pub fn search<'v>(versions: &'v VersionList, range: &NpmRange) -> Option<&'v str> {
    versions
        .iter()
        .find(|raw| parse_version(raw).is_some_and(|v| range.matches(&v)))
}

fn release(found: Option<&str>, options: &NormalizedOptions) -> Result<Resolved> {
    match found {
        Some(version) => {
            debug!("resolved {} to {version}", options.version());
            Ok(Resolved::Release {
                version: version.to_owned(),
            })
        }
        None => Err(ResolveError::NotFound {
            request: serde_json::to_string(options)
                .unwrap_or_else(|_| options.version().to_owned()),
        }),
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests fail fast with a message naming the broken fixture"
)]
mod tests {
    use super::*;
    use crate::catalog::MockVersionCatalog;
    use crate::http::FetchError;
    use crate::options::{RequestOptions, normalize};
    use crate::platform::HostPlatform;
    use crate::revision::{BuildManifest, MockRevisionLookup};
    use rstest::rstest;

    const COMMIT: &str = "0123456789abcdef0123456789abcdef01234567";

    fn options(version: &str) -> NormalizedOptions {
        normalize(
            &RequestOptions::for_version(version),
            &HostPlatform::new("linux", "x64"),
        )
    }

    fn catalog(entries: &'static [&'static str]) -> MockVersionCatalog {
        let mut catalog = MockVersionCatalog::new();
        catalog
            .expect_versions()
            .returning(move || Ok(VersionList::from(entries.to_vec())));
        catalog
    }

    fn unused_revisions() -> MockRevisionLookup {
        let mut revisions = MockRevisionLookup::new();
        revisions.expect_revision().never();
        revisions
    }

    fn resolve(entries: &'static [&'static str], version: &str) -> Result<Resolved> {
        let catalog = catalog(entries);
        let revisions = unused_revisions();
        VersionResolver::new(&catalog, &revisions).resolve(&options(version))
    }

    #[rstest]
    #[case(&["4.2.1", "4.1.9", "4.0.5"])]
    #[case(&["2.6.0", "4.2.1"])]
    #[case(&["9.9.9-rc0"])]
    fn latest_returns_first_entry(#[case] entries: &'static [&'static str]) {
        for selector in ["latest", "unstable"] {
            let resolved = resolve(entries, selector).expect("latest resolves");
            assert_eq!(Some(resolved.version()), entries.first().copied());
        }
    }

    #[test]
    fn latest_on_empty_catalog_is_not_found() {
        let err = resolve(&[], "latest").expect_err("empty catalog");
        assert!(matches!(err, ResolveError::NotFound { .. }));
    }

    #[rstest]
    #[case(&["3.3.1", "3.2.0-rc1", "3.2.0", "3.0.7"], "3.2.0")]
    #[case(&["4.1.9", "4.0.5", "4.2.1"], "4.0.5")]
    #[case(&["not-semver", "2.6.12"], "2.6.12")]
    fn stable_skips_odd_minor_and_prereleases(
        #[case] entries: &'static [&'static str],
        #[case] expected: &str,
    ) {
        let resolved = resolve(entries, "stable").expect("stable resolves");
        assert_eq!(resolved.version(), expected);
    }

    #[test]
    fn stable_without_candidates_is_not_found() {
        let err = resolve(&["3.3.1", "3.2.0-rc1"], "stable").expect_err("no stable entry");
        assert!(matches!(err, ResolveError::NotFound { .. }));
    }

    #[test]
    fn range_takes_first_match_in_catalog_order() {
        let resolved = resolve(&["4.2.1", "4.1.9", "4.0.5"], "^4.0.0").expect("range resolves");
        assert_eq!(resolved, Resolved::Release { version: "4.2.1".to_owned() });
    }

    #[test]
    fn range_does_not_resort_catalog() {
        let resolved = resolve(&["4.0.5", "4.2.1"], "^4.0.0").expect("range resolves");
        assert_eq!(resolved.version(), "4.0.5");
    }

    #[test]
    fn unmatched_range_reports_request() {
        let err = resolve(&["4.2.1"], "9.9.9").expect_err("no match");
        let message = err.to_string();
        assert!(message.contains("9.9.9"), "message: {message}");
        assert!(matches!(err, ResolveError::NotFound { .. }));
    }

    #[rstest]
    #[case::garbage("not-a-version")]
    #[case::bad_operand(">=banana")]
    fn invalid_range_is_not_found(#[case] selector: &str) {
        let err = resolve(&["4.2.1"], selector).expect_err("invalid range");
        assert!(matches!(err, ResolveError::NotFound { .. }), "error: {err}");
        assert!(err.to_string().contains(selector), "message: {err}");
    }

    #[test]
    fn invalid_range_still_reports_unreachable_catalog() {
        let mut catalog = MockVersionCatalog::new();
        catalog.expect_versions().times(1).returning(|| {
            Err(FetchError::Http {
                url: "http://feed.test".to_owned(),
                reason: "connection refused".to_owned(),
            })
        });
        let revisions = unused_revisions();
        let err = VersionResolver::new(&catalog, &revisions)
            .resolve(&options(">=banana"))
            .expect_err("upstream failure");
        assert!(err.is_upstream(), "error: {err}");
    }

    #[test]
    fn catalog_failure_is_upstream() {
        let mut catalog = MockVersionCatalog::new();
        catalog.expect_versions().returning(|| {
            Err(FetchError::Http {
                url: "http://feed.test".to_owned(),
                reason: "connection refused".to_owned(),
            })
        });
        let revisions = unused_revisions();
        let err = VersionResolver::new(&catalog, &revisions)
            .resolve(&options("latest"))
            .expect_err("upstream failure");
        assert!(err.is_upstream());
    }

    #[test]
    fn commit_routes_to_ci_and_builds_basename() {
        let mut catalog = MockVersionCatalog::new();
        catalog.expect_versions().never();
        let mut revisions = MockRevisionLookup::new();
        revisions
            .expect_revision()
            .times(1)
            .returning(|branch, commit| {
                assert_eq!(branch, "master");
                assert_eq!(commit, COMMIT);
                Ok(BuildManifest::new(vec![
                    "mongodb_mongo_master_osx_108_0123".to_owned(),
                    "mongodb_mongo_master_linux_64_0123_15_06".to_owned(),
                ]))
            });

        let resolved = VersionResolver::new(&catalog, &revisions)
            .resolve(&options(COMMIT))
            .expect("commit resolves");
        assert_eq!(
            resolved,
            Resolved::Revision {
                commit: COMMIT.to_owned(),
                distro: "linux_64".to_owned(),
                basename: "binaries-mongodb_mongo_master_linux_64_0123_15_06".to_owned(),
            }
        );
    }

    #[test]
    fn commit_without_matching_build_is_lookup_mismatch() {
        let catalog = MockVersionCatalog::new();
        let mut revisions = MockRevisionLookup::new();
        revisions
            .expect_revision()
            .returning(|_, _| Ok(BuildManifest::new(vec!["unrelated".to_owned()])));

        let err = VersionResolver::new(&catalog, &revisions)
            .resolve(&options(COMMIT))
            .expect_err("no matching build");
        assert!(matches!(err, ResolveError::LookupMismatch { .. }));
    }

    #[test]
    fn unknown_commit_surfaces_ci_message() {
        let catalog = MockVersionCatalog::new();
        let mut revisions = MockRevisionLookup::new();
        revisions.expect_revision().returning(|_, _| {
            Err(FetchError::NotFound {
                url: "http://ci.test".to_owned(),
                message: "revision not found".to_owned(),
            })
        });

        let err = VersionResolver::new(&catalog, &revisions)
            .resolve(&options(COMMIT))
            .expect_err("unknown revision");
        assert_eq!(err.to_string(), "revision not found");
    }
}
