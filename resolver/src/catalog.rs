//! The release catalog: every published server version, newest first.
//!
//! Resolution scans the catalog in order and takes the first match, so the
//! ordering is a precondition of [`VersionCatalog`]. Providers whose source
//! is not already ordered build their list with [`VersionList::sorted`],
//! which applies [`compare_newest_first`].

use crate::http::{FetchError, HttpClient};
use crate::range::parse_version;
use serde::Deserialize;
use std::cmp::Ordering;

/// Default location of the public release feed.
pub const DEFAULT_RELEASE_FEED_URL: &str = "https://downloads.mongodb.org/full.json";

/// Published version strings ordered newest first.
///
/// # Examples
///
/// ```
/// use mongodb_download_url::catalog::VersionList;
///
/// let list = VersionList::sorted(vec!["3.0.7".into(), "3.2.0".into(), "2.6.12".into()]);
/// assert_eq!(list.first(), Some("3.2.0"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionList(Vec<String>);

impl VersionList {
    /// Wrap a list the caller guarantees to be newest first.
    #[must_use]
    pub fn newest_first(versions: Vec<String>) -> Self {
        Self(versions)
    }

    /// Order an arbitrary list with [`compare_newest_first`].
    ///
    /// The sort is stable, so entries that compare equal keep their
    /// relative order.
    #[must_use]
    pub fn sorted(mut versions: Vec<String>) -> Self {
        versions.sort_by(|a, b| compare_newest_first(a, b));
        Self(versions)
    }

    /// Return the newest entry.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Iterate over entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Return the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<&str>> for VersionList {
    fn from(value: Vec<&str>) -> Self {
        Self(value.into_iter().map(str::to_owned).collect())
    }
}

/// Newest-first ordering for version strings.
///
/// Semantic versions compare by semver precedence, descending. Strings that
/// are not semantic versions sort after all that are, and compare equal to
/// each other.
#[must_use]
pub fn compare_newest_first(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Source of published versions.
///
/// Implementations must return entries newest first.
#[cfg_attr(test, mockall::automock)]
pub trait VersionCatalog: Send + Sync {
    /// Fetch the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the upstream cannot be reached or its
    /// answer cannot be decoded.
    fn versions(&self) -> Result<VersionList, FetchError>;
}

#[derive(Debug, Deserialize)]
struct ReleaseFeed {
    versions: Vec<ReleaseEntry>,
}

#[derive(Debug, Deserialize)]
struct ReleaseEntry {
    version: String,
}

/// Catalog backed by the public JSON release feed.
#[derive(Debug, Clone)]
pub struct HttpVersionCatalog {
    client: HttpClient,
    feed_url: String,
}

impl HttpVersionCatalog {
    /// Read the feed at `feed_url` through `client`.
    #[must_use]
    pub fn new(client: HttpClient, feed_url: impl Into<String>) -> Self {
        Self {
            client,
            feed_url: feed_url.into(),
        }
    }
}

impl VersionCatalog for HttpVersionCatalog {
    fn versions(&self) -> Result<VersionList, FetchError> {
        log::debug!("fetching release catalog from {}", self.feed_url);
        let response = self.client.get(&self.feed_url)?;
        if !response.is_success() {
            return Err(FetchError::Status {
                url: self.feed_url.clone(),
                status: response.status,
            });
        }
        let list = parse_release_feed(&response.body).map_err(|e| FetchError::Decode {
            url: self.feed_url.clone(),
            reason: e.to_string(),
        })?;
        log::debug!("release catalog has {} entries", list.len());
        Ok(list)
    }
}

/// Decode a release feed body into a newest-first list.
///
/// # Errors
///
/// Returns the JSON error when the body is not a release feed.
pub fn parse_release_feed(body: &str) -> Result<VersionList, serde_json::Error> {
    let feed: ReleaseFeed = serde_json::from_str(body)?;
    Ok(VersionList::sorted(
        feed.versions.into_iter().map(|entry| entry.version).collect(),
    ))
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests fail fast with a message naming the broken fixture"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn sorted_orders_by_semver_precedence() {
        let list = VersionList::sorted(vec![
            "3.0.7".to_owned(),
            "3.0.10".to_owned(),
            "3.1.0-rc0".to_owned(),
            "3.1.0".to_owned(),
        ]);
        let ordered: Vec<&str> = list.iter().collect();
        assert_eq!(ordered, ["3.1.0", "3.1.0-rc0", "3.0.10", "3.0.7"]);
    }

    #[test]
    fn sorted_places_unparsable_entries_last_in_original_order() {
        let list = VersionList::sorted(vec![
            "nightly".to_owned(),
            "2.6.0".to_owned(),
            "legacy".to_owned(),
            "3.0.0".to_owned(),
        ]);
        let ordered: Vec<&str> = list.iter().collect();
        assert_eq!(ordered, ["3.0.0", "2.6.0", "nightly", "legacy"]);
    }

    #[test]
    fn newest_first_keeps_caller_order() {
        let list = VersionList::newest_first(vec!["1.0.0".to_owned(), "2.0.0".to_owned()]);
        assert_eq!(list.first(), Some("1.0.0"));
    }

    #[rstest]
    #[case("3.2.0", "3.0.0", Ordering::Less)]
    #[case("3.0.0", "3.2.0", Ordering::Greater)]
    #[case("3.0.0", "3.0.0", Ordering::Equal)]
    #[case("3.0.0", "junk", Ordering::Less)]
    fn comparator_is_descending(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare_newest_first(a, b), expected);
    }

    #[test]
    fn parses_release_feed() {
        let body = r#"{"versions":[
            {"version":"4.0.5","production_release":true,"downloads":[]},
            {"version":"4.2.1","production_release":true},
            {"version":"4.1.9","development_release":true}
        ]}"#;
        let list = parse_release_feed(body).expect("valid feed");
        let ordered: Vec<&str> = list.iter().collect();
        assert_eq!(ordered, ["4.2.1", "4.1.9", "4.0.5"]);
    }

    #[test]
    fn rejects_feed_without_versions() {
        assert!(parse_release_feed(r#"{"releases":[]}"#).is_err());
    }

    #[test]
    fn empty_list_has_no_first_entry() {
        let list = VersionList::default();
        assert!(list.is_empty());
        assert_eq!(list.first(), None);
    }
}
