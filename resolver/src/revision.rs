//! CI revision lookups for commit-hash requests.
//!
//! A 40-character selector names a commit on a source branch. The CI REST
//! API lists the builds produced for that revision; the artefact is the
//! build whose name contains `mongodb_mongo_<branch>_<distro>`.

use crate::http::{FetchError, HttpClient};
use crate::options::NormalizedOptions;
use crate::platform::Platform;
use serde::Deserialize;

/// Default root of the CI REST API.
pub const DEFAULT_CI_API_ROOT: &str = "http://mci-motu.10gen.cc:9090/rest/v1";

/// Prefix shared by every CI project for the server.
const PROJECT_PREFIX: &str = "mongodb-mongo";

/// Prefix of the archive basename for CI builds.
pub const BINARIES_PREFIX: &str = "binaries-";

/// Distro CI uses for every Windows build.
const CI_WINDOWS_DISTRO: &str = "windows_64_2k8";

/// The builds listed for one revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildManifest {
    #[serde(default)]
    builds: Vec<String>,
}

impl BuildManifest {
    /// Create a manifest listing `builds`.
    #[must_use]
    pub fn new(builds: Vec<String>) -> Self {
        Self { builds }
    }

    /// Return the listed build names.
    #[must_use]
    pub fn builds(&self) -> &[String] {
        &self.builds
    }

    /// Return the first build whose name contains `fragment`.
    #[must_use]
    pub fn find_build(&self, fragment: &str) -> Option<&str> {
        self.builds
            .iter()
            .map(String::as_str)
            .find(|build| build.contains(fragment))
    }
}

/// Return the distro CI uses for `options`.
///
/// CI names every Windows build `windows_64_2k8`, whatever distro the
/// request normalised to.
#[must_use]
pub fn ci_distro(options: &NormalizedOptions) -> String {
    match options.platform() {
        Platform::Win32 if options.debug() => format!("{CI_WINDOWS_DISTRO}_debug"),
        Platform::Win32 => CI_WINDOWS_DISTRO.to_owned(),
        _ => options.distro().to_owned(),
    }
}

/// Return the substring identifying the wanted build in a manifest.
///
/// # Examples
///
/// ```
/// use mongodb_download_url::revision::build_fragment;
///
/// assert_eq!(build_fragment("master", "linux_64"), "mongodb_mongo_master_linux_64");
/// ```
#[must_use]
pub fn build_fragment(branch: &str, distro: &str) -> String {
    format!("mongodb_mongo_{branch}_{distro}")
}

/// Return the CI project name for `branch`.
#[must_use]
pub fn project_name(branch: &str) -> String {
    format!("{PROJECT_PREFIX}-{branch}")
}

/// Source of CI build manifests.
#[cfg_attr(test, mockall::automock)]
pub trait RevisionLookup: Send + Sync {
    /// Fetch the build manifest for `commit` on `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NotFound`] carrying the upstream message when
    /// the revision is unknown, or another [`FetchError`] when the request
    /// fails.
    fn revision(&self, branch: &str, commit: &str) -> Result<BuildManifest, FetchError>;
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

/// Revision lookup backed by the CI REST API.
#[derive(Debug, Clone)]
pub struct HttpRevisionLookup {
    client: HttpClient,
    api_root: String,
}

impl HttpRevisionLookup {
    /// Query the API rooted at `api_root` through `client`.
    #[must_use]
    pub fn new(client: HttpClient, api_root: impl Into<String>) -> Self {
        Self {
            client,
            api_root: api_root.into(),
        }
    }

    /// Return the revision endpoint for `commit` on `branch`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mongodb_download_url::http::HttpClient;
    /// use mongodb_download_url::revision::HttpRevisionLookup;
    ///
    /// let lookup = HttpRevisionLookup::new(HttpClient::default(), "http://ci.test/rest/v1/");
    /// assert_eq!(
    ///     lookup.revision_url("master", "abc"),
    ///     "http://ci.test/rest/v1/projects/mongodb-mongo-master/revisions/abc"
    /// );
    /// ```
    #[must_use]
    pub fn revision_url(&self, branch: &str, commit: &str) -> String {
        format!(
            "{}/projects/{}/revisions/{commit}",
            self.api_root.trim_end_matches('/'),
            project_name(branch)
        )
    }
}

impl RevisionLookup for HttpRevisionLookup {
    fn revision(&self, branch: &str, commit: &str) -> Result<BuildManifest, FetchError> {
        let url = self.revision_url(branch, commit);
        log::debug!("resolving revision via CI `{url}`");
        let response = self.client.get(&url)?;
        match response.status {
            404 => Err(FetchError::NotFound {
                message: not_found_message(&response.body, &url),
                url,
            }),
            _ if response.is_success() => {
                serde_json::from_str(&response.body).map_err(|e| FetchError::Decode {
                    url,
                    reason: e.to_string(),
                })
            }
            status => Err(FetchError::Status { url, status }),
        }
    }
}

/// Extract the `message` field of a 404 body.
fn not_found_message(body: &str, url: &str) -> String {
    serde_json::from_str::<ApiMessage>(body)
        .ok()
        .map(|api| api.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("revision not found at {url}"))
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests fail fast with a message naming the broken fixture"
)]
mod tests {
    use super::*;
    use crate::options::{RequestOptions, normalize};
    use crate::platform::HostPlatform;
    use rstest::rstest;

    fn options(platform: &str, debug: bool) -> NormalizedOptions {
        let request = RequestOptions {
            platform: Some(platform.to_owned()),
            debug,
            ..RequestOptions::for_version("0123456789abcdef0123456789abcdef01234567")
        };
        normalize(&request, &HostPlatform::new("linux", "x64"))
    }

    #[rstest]
    #[case("linux", false, "linux_64")]
    #[case("linux", true, "linux_64_debug")]
    #[case("win32", false, "windows_64_2k8")]
    #[case("windows", true, "windows_64_2k8_debug")]
    #[case("osx", false, "")]
    fn ci_distro_overrides_windows_only(
        #[case] platform: &str,
        #[case] debug: bool,
        #[case] expected: &str,
    ) {
        assert_eq!(ci_distro(&options(platform, debug)), expected);
    }

    #[test]
    fn find_build_returns_first_substring_match() {
        let manifest = BuildManifest::new(vec![
            "mongodb_mongo_master_osx_108_abc".to_owned(),
            "mongodb_mongo_master_linux_64_abc_1".to_owned(),
            "mongodb_mongo_master_linux_64_abc_2".to_owned(),
        ]);
        assert_eq!(
            manifest.find_build("mongodb_mongo_master_linux_64"),
            Some("mongodb_mongo_master_linux_64_abc_1")
        );
        assert_eq!(manifest.find_build("mongodb_mongo_v3.0_linux_64"), None);
    }

    #[test]
    fn manifest_deserialises_from_api_body() {
        let manifest: BuildManifest =
            serde_json::from_str(r#"{"revision":"abc","builds":["a","b"]}"#).expect("valid body");
        assert_eq!(manifest.builds(), ["a", "b"]);
    }

    #[test]
    fn manifest_without_builds_is_empty() {
        let manifest: BuildManifest = serde_json::from_str("{}").expect("valid body");
        assert!(manifest.builds().is_empty());
    }

    #[rstest]
    #[case(r#"{"message":"revision not found"}"#, "revision not found")]
    #[case(r#"{"message":""}"#, "revision not found at http://ci.test")]
    #[case("<html>", "revision not found at http://ci.test")]
    fn not_found_prefers_upstream_message(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(not_found_message(body, "http://ci.test"), expected);
    }
}
