//! Artifact naming policy.
//!
//! Release archives are named
//! `mongodb-<platform>-x86_64-[enterprise-]<distro><sep>[-debugsymbols-]<version><ext>`
//! and served from the community or enterprise download host. CI builds
//! are named `binaries-<build><ext>` and served from the CI upload bucket.
//! Both paths are pure string assembly over already-resolved inputs.

use crate::options::NormalizedOptions;
use crate::resolver::Resolved;
use serde::{Deserialize, Serialize};

/// Product name reported in every descriptor.
pub const PRODUCT_NAME: &str = "mongodb";

/// Default download root for community builds.
pub const COMMUNITY_DOWNLOAD_ROOT: &str = "http://fastdl.mongodb.org/";

/// Default download root for enterprise builds.
pub const ENTERPRISE_DOWNLOAD_ROOT: &str = "http://downloads.mongodb.com/";

/// Default root of the CI upload bucket.
pub const CI_ARTIFACT_ROOT: &str = "https://s3.amazonaws.com/mciuploads/";

/// Infix marking enterprise archives.
const ENTERPRISE_INFIX: &str = "enterprise-";

/// Infix marking debug-symbol archives.
const DEBUG_INFIX: &str = "-debugsymbols-";

/// A resolved, fetchable artifact.
///
/// Serialises as `{"name", "version", "artifact", "url"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    name: String,
    version: String,
    artifact: String,
    url: String,
}

impl ArtifactDescriptor {
    /// Create a descriptor for `version` published as `artifact` at `url`.
    #[must_use]
    pub fn new(version: impl Into<String>, artifact: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: PRODUCT_NAME.to_owned(),
            version: version.into(),
            artifact: artifact.into(),
            url: url.into(),
        }
    }

    /// Return the product name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the resolved version (or commit hash for CI builds).
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Return the artifact filename.
    #[must_use]
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// Return the download URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Assembles artifact names and URLs.
///
/// # Examples
///
/// ```
/// use mongodb_download_url::naming::ArtifactNamer;
/// use mongodb_download_url::options::{RequestOptions, normalize};
/// use mongodb_download_url::platform::HostPlatform;
///
/// let options = normalize(
///     &RequestOptions::for_version("3.0.7"),
///     &HostPlatform::new("darwin", "x64"),
/// );
/// let descriptor = ArtifactNamer::default().release(&options, "3.0.7");
///
/// assert_eq!(descriptor.artifact(), "mongodb-osx-x86_64-3.0.7.tgz");
/// assert_eq!(
///     descriptor.url(),
///     "http://fastdl.mongodb.org/osx/mongodb-osx-x86_64-3.0.7.tgz"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNamer {
    community_root: String,
    enterprise_root: String,
    ci_root: String,
}

impl ArtifactNamer {
    /// Create a namer over the given download roots.
    ///
    /// Each root gains a trailing `/` if it lacks one.
    #[must_use]
    pub fn new(community_root: &str, enterprise_root: &str, ci_root: &str) -> Self {
        Self {
            community_root: with_trailing_slash(community_root),
            enterprise_root: with_trailing_slash(enterprise_root),
            ci_root: with_trailing_slash(ci_root),
        }
    }

    /// Name the artifact for a resolution outcome.
    #[must_use]
    pub fn name(&self, options: &NormalizedOptions, resolved: &Resolved) -> ArtifactDescriptor {
        match resolved {
            Resolved::Release { version } => self.release(options, version),
            Resolved::Revision {
                commit,
                distro,
                basename,
            } => self.revision(options, commit, distro, basename),
        }
    }

    /// Name a release archive for `version`.
    #[must_use]
    pub fn release(&self, options: &NormalizedOptions, version: &str) -> ArtifactDescriptor {
        let filename = format!(
            "{}{}",
            release_basename(options, version),
            options.extension()
        );
        let root = if options.enterprise() {
            &self.enterprise_root
        } else {
            &self.community_root
        };
        let url = format!("{root}{}/{filename}", options.platform());
        ArtifactDescriptor::new(version, filename, url)
    }

    /// Name a CI build archive.
    #[must_use]
    pub fn revision(
        &self,
        options: &NormalizedOptions,
        commit: &str,
        distro: &str,
        basename: &str,
    ) -> ArtifactDescriptor {
        let filename = format!("{basename}{}", options.extension());
        let url = format!(
            "{}mongodb-mongo-{}/{distro}/{commit}/binaries/{filename}",
            self.ci_root,
            options.branch()
        );
        ArtifactDescriptor::new(commit, filename, url)
    }
}

impl Default for ArtifactNamer {
    fn default() -> Self {
        Self::new(
            COMMUNITY_DOWNLOAD_ROOT,
            ENTERPRISE_DOWNLOAD_ROOT,
            CI_ARTIFACT_ROOT,
        )
    }
}

/// Return the release archive basename (without extension).
#[must_use]
pub fn release_basename(options: &NormalizedOptions, version: &str) -> String {
    let edition = if options.enterprise() {
        ENTERPRISE_INFIX
    } else {
        ""
    };
    let debug = if options.debug() { DEBUG_INFIX } else { "" };
    format!(
        "{PRODUCT_NAME}-{}-x86_64-{edition}{}{}{debug}{version}",
        options.platform(),
        options.distro(),
        options.separator()
    )
}

fn with_trailing_slash(root: &str) -> String {
    if root.ends_with('/') {
        root.to_owned()
    } else {
        format!("{root}/")
    }
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
    use rstest::{fixture, rstest};

    #[fixture]
    fn namer() -> ArtifactNamer {
        ArtifactNamer::default()
    }

    fn options(platform: &str, enterprise: bool, debug: bool) -> NormalizedOptions {
        let request = RequestOptions {
            platform: Some(platform.to_owned()),
            enterprise,
            debug,
            ..RequestOptions::for_version("3.0.7")
        };
        normalize(&request, &HostPlatform::new("linux", "x64"))
    }

    #[rstest]
    #[case::osx("osx", false, false, "mongodb-osx-x86_64-3.0.7.tgz")]
    #[case::linux("linux", false, false, "mongodb-linux-x86_64-linux_64-3.0.7.tgz")]
    #[case::windows("win32", false, false, "mongodb-win32-x86_64-2008plus-ssl-3.0.7.zip")]
    #[case::windows_enterprise(
        "win32",
        true,
        false,
        "mongodb-win32-x86_64-enterprise-windows-64-3.0.7.zip"
    )]
    #[case::windows_enterprise_debug(
        "windows",
        true,
        true,
        "mongodb-win32-x86_64-enterprise-windows-64_debug--debugsymbols-3.0.7.zip"
    )]
    #[case::osx_debug("darwin", false, true, "mongodb-osx-x86_64-_debug-debugsymbols-3.0.7.tgz")]
    fn release_filenames(
        namer: ArtifactNamer,
        #[case] platform: &str,
        #[case] enterprise: bool,
        #[case] debug: bool,
        #[case] expected: &str,
    ) {
        let descriptor = namer.release(&options(platform, enterprise, debug), "3.0.7");
        assert_eq!(descriptor.artifact(), expected);
        assert_eq!(descriptor.name(), "mongodb");
        assert_eq!(descriptor.version(), "3.0.7");
    }

    #[rstest]
    fn enterprise_debug_windows_has_both_infixes(namer: ArtifactNamer) {
        let descriptor = namer.release(&options("win32", true, true), "3.0.7");
        assert!(descriptor.artifact().contains("-enterprise-"));
        assert!(descriptor.artifact().contains("-debugsymbols-"));
        assert!(descriptor.artifact().ends_with(".zip"));
    }

    #[rstest]
    #[case(false, "http://fastdl.mongodb.org/linux/")]
    #[case(true, "http://downloads.mongodb.com/linux/")]
    fn release_url_root_follows_edition(
        namer: ArtifactNamer,
        #[case] enterprise: bool,
        #[case] prefix: &str,
    ) {
        let descriptor = namer.release(&options("linux", enterprise, false), "3.0.7");
        assert!(descriptor.url().starts_with(prefix), "url: {}", descriptor.url());
        assert!(descriptor.url().ends_with(descriptor.artifact()));
    }

    #[rstest]
    fn revision_url_uses_ci_bucket(namer: ArtifactNamer) {
        let commit = "0123456789abcdef0123456789abcdef01234567";
        let descriptor = namer.revision(
            &options("linux", false, false),
            commit,
            "linux_64",
            "binaries-mongodb_mongo_master_linux_64_0123",
        );
        assert_eq!(
            descriptor.artifact(),
            "binaries-mongodb_mongo_master_linux_64_0123.tgz"
        );
        assert_eq!(
            descriptor.url(),
            concat!(
                "https://s3.amazonaws.com/mciuploads/mongodb-mongo-master/linux_64/",
                "0123456789abcdef0123456789abcdef01234567/binaries/",
                "binaries-mongodb_mongo_master_linux_64_0123.tgz"
            )
        );
        assert_eq!(descriptor.version(), commit);
    }

    #[test]
    fn custom_roots_gain_trailing_slash() {
        let namer = ArtifactNamer::new("http://mirror.test", "http://ent.test/", "http://ci.test");
        let descriptor = namer.release(&options("linux", false, false), "3.0.7");
        assert_eq!(
            descriptor.url(),
            "http://mirror.test/linux/mongodb-linux-x86_64-linux_64-3.0.7.tgz"
        );
    }

    #[test]
    fn name_dispatches_on_resolution_kind() {
        let namer = ArtifactNamer::default();
        let opts = options("linux", false, false);
        let release = namer.name(
            &opts,
            &Resolved::Release {
                version: "3.0.7".to_owned(),
            },
        );
        assert!(release.url().starts_with(COMMUNITY_DOWNLOAD_ROOT));

        let revision = namer.name(
            &opts,
            &Resolved::Revision {
                commit: "c".repeat(40),
                distro: "linux_64".to_owned(),
                basename: "binaries-x".to_owned(),
            },
        );
        assert!(revision.url().starts_with(CI_ARTIFACT_ROOT));
    }

    #[test]
    fn descriptor_serialises_in_public_shape() {
        let descriptor = ArtifactDescriptor::new("3.0.7", "a.tgz", "http://x/a.tgz");
        let json = serde_json::to_string(&descriptor).expect("serialise");
        assert_eq!(
            json,
            r#"{"name":"mongodb","version":"3.0.7","artifact":"a.tgz","url":"http://x/a.tgz"}"#
        );
    }
}
