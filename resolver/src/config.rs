//! Resolver configuration.
//!
//! Settings live in a TOML file. Every key is optional and falls back to
//! the public MongoDB endpoints, so an absent file is equivalent to an empty
//! one:
//!
//! ```toml
//! release_feed_url = "https://downloads.mongodb.org/full.json"
//! community_download_root = "http://fastdl.mongodb.org/"
//! enterprise_download_root = "http://downloads.mongodb.com/"
//! ci_api_root = "http://mci-motu.10gen.cc:9090/rest/v1"
//! ci_artifact_root = "https://s3.amazonaws.com/mciuploads/"
//! timeout_secs = 30
//!
//! [host]
//! platform = "linux"
//! arch = "x86_64"
//! ```
//!
//! The `[host]` table pins the defaults used when a request omits its
//! platform or architecture; unset keys fall back to the running machine.

use crate::catalog::DEFAULT_RELEASE_FEED_URL;
use crate::http::DEFAULT_TIMEOUT;
use crate::naming::{
    ArtifactNamer, CI_ARTIFACT_ROOT, COMMUNITY_DOWNLOAD_ROOT, ENTERPRISE_DOWNLOAD_ROOT,
};
use crate::platform::HostPlatform;
use crate::revision::DEFAULT_CI_API_ROOT;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Directory name used under the platform configuration directory.
const APP_DIR: &str = "mongodb-download-url";

/// Configuration file name.
const CONFIG_FILE: &str = "config.toml";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration at {path}")]
    Read {
        /// Path of the file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid.
    #[error("invalid configuration at {path}: {reason}")]
    Parse {
        /// Path of the file.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },
}

/// Host defaults pinned by configuration.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HostOverride {
    /// Platform used when a request names none.
    pub platform: Option<String>,
    /// Architecture used when a request names none.
    pub arch: Option<String>,
}

/// Endpoints and defaults for resolution.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// JSON feed listing every published version.
    pub release_feed_url: String,
    /// Download root for community archives.
    pub community_download_root: String,
    /// Download root for enterprise archives.
    pub enterprise_download_root: String,
    /// Root of the CI REST API.
    pub ci_api_root: String,
    /// Root of the CI artefact bucket.
    pub ci_artifact_root: String,
    /// Timeout for upstream requests, in seconds.
    pub timeout_secs: u64,
    /// Host defaults.
    pub host: HostOverride,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            release_feed_url: DEFAULT_RELEASE_FEED_URL.to_owned(),
            community_download_root: COMMUNITY_DOWNLOAD_ROOT.to_owned(),
            enterprise_download_root: ENTERPRISE_DOWNLOAD_ROOT.to_owned(),
            ci_api_root: DEFAULT_CI_API_ROOT.to_owned(),
            ci_artifact_root: CI_ARTIFACT_ROOT.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            host: HostOverride::default(),
        }
    }
}

impl ResolverConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use mongodb_download_url::config::ResolverConfig;
    ///
    /// let config = ResolverConfig::from_toml_str("timeout_secs = 5\n", Utf8Path::new("inline"))
    ///     .expect("valid configuration");
    /// assert_eq!(config.timeout_secs, 5);
    /// assert_eq!(config.release_feed_url, "https://downloads.mongodb.org/full.json");
    /// ```
    pub fn from_toml_str(source: &str, origin: &Utf8Path) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse {
            path: origin.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Load configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is invalid.
    pub fn load_from(path: &Utf8Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&source, path)
    }

    /// Load configuration from an explicit path, or from the default
    /// location when `path` is `None`.
    ///
    /// A missing default file yields the default configuration; a missing
    /// explicit file is an error.
    ///
    /// # Errors
    ///
    /// Propagates [`ResolverConfig::load_from`] failures.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        if let Some(explicit) = path {
            return Self::load_from(explicit);
        }
        match default_config_path() {
            Some(default) if default.is_file() => {
                log::debug!("loading configuration from {default}");
                Self::load_from(&default)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Return the upstream request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Return the host defaults, detecting unset values.
    #[must_use]
    pub fn host_platform(&self) -> HostPlatform {
        let detected = HostPlatform::detect();
        HostPlatform::new(
            self.host
                .platform
                .as_deref()
                .unwrap_or_else(|| detected.platform().as_str()),
            self.host.arch.as_deref().unwrap_or_else(|| detected.arch()),
        )
    }

    /// Build the artifact namer for the configured download roots.
    #[must_use]
    pub fn namer(&self) -> ArtifactNamer {
        ArtifactNamer::new(
            &self.community_download_root,
            &self.enterprise_download_root,
            &self.ci_artifact_root,
        )
    }
}

/// Return the default configuration file path, if the platform has a
/// configuration directory with a UTF-8 path.
#[must_use]
pub fn default_config_path() -> Option<Utf8PathBuf> {
    let dirs = directories_next::BaseDirs::new()?;
    let path = dirs.config_dir().join(APP_DIR).join(CONFIG_FILE);
    match Utf8PathBuf::try_from(path) {
        Ok(utf8) => Some(utf8),
        Err(e) => {
            log::warn!("ignoring non UTF-8 configuration path: {e}");
            None
        }
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

    fn parse(source: &str) -> Result<ResolverConfig, ConfigError> {
        ResolverConfig::from_toml_str(source, Utf8Path::new("test.toml"))
    }

    #[rstest]
    fn empty_source_yields_defaults() {
        let config = parse("").expect("empty config");
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[rstest]
    fn overrides_are_applied() {
        let config = parse(concat!(
            "community_download_root = \"http://mirror.test/\"\n",
            "timeout_secs = 3\n",
            "[host]\n",
            "platform = \"darwin\"\n",
        ))
        .expect("valid config");

        assert_eq!(config.community_download_root, "http://mirror.test/");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.host_platform().platform().as_str(), "osx");
    }

    #[rstest]
    #[case("unknown_key = 1\n")]
    #[case("[host]\nos = \"linux\"\n")]
    #[case("timeout_secs = \"soon\"\n")]
    fn invalid_sources_are_rejected(#[case] source: &str) {
        let err = parse(source).expect_err("invalid config");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("test.toml"));
    }

    #[test]
    fn host_arch_override_is_canonicalised() {
        let config = parse("[host]\nplatform = \"linux\"\narch = \"x64\"\n").expect("valid config");
        let host = config.host_platform();
        assert_eq!(host.arch(), "x86_64");
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(dir.path().join("config.toml")).expect("UTF-8 path");
        std::fs::write(&path, "timeout_secs = 7\n").expect("write config");

        let config = ResolverConfig::load(Some(&path)).expect("load config");
        assert_eq!(config.timeout_secs, 7);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(dir.path().join("absent.toml")).expect("UTF-8 path");

        let err = ResolverConfig::load(Some(&path)).expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn namer_uses_configured_roots() {
        let config = parse("enterprise_download_root = \"http://ent.test\"\n").expect("valid");
        let expected = ArtifactNamer::new(
            COMMUNITY_DOWNLOAD_ROOT,
            "http://ent.test/",
            CI_ARTIFACT_ROOT,
        );
        assert_eq!(config.namer(), expected);
    }
}
