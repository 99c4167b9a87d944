//! Request options and their normalisation.
//!
//! A [`RequestOptions`] value is whatever the caller supplied: only the
//! version selector is mandatory. [`normalize`] turns it into a
//! [`NormalizedOptions`] with every field the naming rules need, applying
//! the rules in a fixed order:
//!
//! 1. host and branch defaults,
//! 2. digit-only bit width,
//! 3. platform aliases,
//! 4. archive extension,
//! 5. distro derivation (plus the `_debug` suffix),
//! 6. the distro/version separator.
//!
//! Normalisation never fails and is idempotent: feeding
//! [`NormalizedOptions::to_request`] back through [`normalize`] yields the
//! same options, whatever the host.

use crate::platform::{HostPlatform, Platform};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Branch used when a request names none.
pub const DEFAULT_BRANCH: &str = "master";

/// Bit width used when a request names none.
pub const DEFAULT_BITS: &str = "64";

/// Suffix appended to derived distros for debug builds.
const DEBUG_DISTRO_SUFFIX: &str = "_debug";

/// Bit width as supplied by a caller: `64`, `"64"`, or `"64bit"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bits {
    /// Numeric form.
    Number(u64),
    /// Free-form text; non-digit characters are dropped.
    Text(String),
}

impl Bits {
    /// Return the digits of this bit width.
    ///
    /// # Examples
    ///
    /// ```
    /// use mongodb_download_url::options::Bits;
    ///
    /// assert_eq!(Bits::Text("64bit".to_owned()).digits(), "64");
    /// assert_eq!(Bits::Number(32).digits(), "32");
    /// ```
    #[must_use]
    pub fn digits(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(text) => text.chars().filter(char::is_ascii_digit).collect(),
        }
    }
}

impl From<u64> for Bits {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Bits {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// A possibly partial resolution request.
///
/// Field names match the JSON request shape
/// `{version, platform?, arch?, bits?, branch?, distro?, enterprise?, debug?}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestOptions {
    /// Version selector: a semver range, `latest`, `unstable`, `stable`, or
    /// a 40-character commit hash.
    pub version: String,
    /// Target platform; defaults to the host platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Target architecture; defaults to the host architecture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    /// Bit width; defaults to `64`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bits: Option<Bits>,
    /// Source branch used for CI revision lookups; defaults to `master`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Explicit distro tag; derived from the platform when absent or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distro: Option<String>,
    /// Request the enterprise edition.
    #[serde(default)]
    pub enterprise: bool,
    /// Request the debug-symbols build.
    #[serde(default)]
    pub debug: bool,
}

impl RequestOptions {
    /// Create a request carrying only a version selector.
    ///
    /// # Examples
    ///
    /// ```
    /// use mongodb_download_url::options::RequestOptions;
    ///
    /// let request = RequestOptions::for_version("3.0.7");
    /// assert_eq!(request.version, "3.0.7");
    /// assert!(request.platform.is_none());
    /// ```
    #[must_use]
    pub fn for_version(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }
}

impl From<&str> for RequestOptions {
    fn from(value: &str) -> Self {
        Self::for_version(value)
    }
}

/// Archive format of a published artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArchiveExtension {
    /// `.zip`, used for Windows builds.
    #[serde(rename = ".zip")]
    Zip,
    /// `.tgz`, used everywhere else.
    #[serde(rename = ".tgz")]
    Tgz,
}

impl ArchiveExtension {
    /// Return the archive extension for `platform`.
    #[must_use]
    pub fn for_platform(platform: &Platform) -> Self {
        match platform {
            Platform::Win32 => Self::Zip,
            _ => Self::Tgz,
        }
    }

    /// Return the extension including its leading dot.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::Tgz => ".tgz",
        }
    }
}

impl fmt::Display for ArchiveExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully populated, internally consistent request options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedOptions {
    version: String,
    platform: Platform,
    arch: String,
    bits: String,
    branch: String,
    distro: String,
    enterprise: bool,
    debug: bool,
    extension: ArchiveExtension,
}

impl NormalizedOptions {
    /// Return the version selector.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Return the canonical platform.
    #[must_use]
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Return the architecture.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Return the digit-only bit width.
    #[must_use]
    pub fn bits(&self) -> &str {
        &self.bits
    }

    /// Return the branch.
    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Return the distro tag, which may be empty (macOS).
    #[must_use]
    pub fn distro(&self) -> &str {
        &self.distro
    }

    /// Whether the enterprise edition was requested.
    #[must_use]
    pub fn enterprise(&self) -> bool {
        self.enterprise
    }

    /// Whether the debug-symbols build was requested.
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Return the archive extension.
    #[must_use]
    pub fn extension(&self) -> ArchiveExtension {
        self.extension
    }

    /// Return the separator placed between the distro and the version.
    ///
    /// macOS archives carry no distro, so the separator is omitted there.
    #[must_use]
    pub fn separator(&self) -> &'static str {
        match self.platform {
            Platform::Osx => "",
            _ => "-",
        }
    }

    /// Convert back into an explicit request.
    ///
    /// Every field is set, so normalising the result ignores host defaults.
    #[must_use]
    pub fn to_request(&self) -> RequestOptions {
        RequestOptions {
            version: self.version.clone(),
            platform: Some(self.platform.as_str().to_owned()),
            arch: Some(self.arch.clone()),
            bits: Some(Bits::Text(self.bits.clone())),
            branch: Some(self.branch.clone()),
            distro: Some(self.distro.clone()),
            enterprise: self.enterprise,
            debug: self.debug,
        }
    }
}

/// Normalise `request`, filling gaps from `host`.
///
/// # Examples
///
/// ```
/// use mongodb_download_url::options::{RequestOptions, normalize};
/// use mongodb_download_url::platform::HostPlatform;
///
/// let host = HostPlatform::new("linux", "x64");
/// let options = normalize(&RequestOptions::for_version("3.0.7"), &host);
///
/// assert_eq!(options.platform().as_str(), "linux");
/// assert_eq!(options.arch(), "x86_64");
/// assert_eq!(options.distro(), "linux_64");
/// assert_eq!(options.extension().as_str(), ".tgz");
/// ```
#[must_use]
pub fn normalize(request: &RequestOptions, host: &HostPlatform) -> NormalizedOptions {
    let platform = request
        .platform
        .as_deref()
        .map_or_else(|| host.platform().clone(), Platform::canonical);
    let arch = request
        .arch
        .clone()
        .unwrap_or_else(|| host.arch().to_owned());
    let bits = request
        .bits
        .as_ref()
        .map_or_else(|| DEFAULT_BITS.to_owned(), Bits::digits);
    let branch = request
        .branch
        .clone()
        .unwrap_or_else(|| DEFAULT_BRANCH.to_owned());
    let extension = ArchiveExtension::for_platform(&platform);

    let distro = match request.distro.as_deref().filter(|d| !d.is_empty()) {
        Some(explicit) => explicit.to_owned(),
        None => {
            let mut derived = derive_distro(&platform, &bits, request.enterprise);
            if request.debug {
                derived.push_str(DEBUG_DISTRO_SUFFIX);
            }
            derived
        }
    };

    NormalizedOptions {
        version: request.version.clone(),
        platform,
        arch,
        bits,
        branch,
        distro,
        enterprise: request.enterprise,
        debug: request.debug,
        extension,
    }
}

/// Derive a distro tag from the platform.
///
/// `2008plus-ssl` is the historical packaging name for community Windows
/// builds and applies to every platform not listed explicitly.
fn derive_distro(platform: &Platform, bits: &str, enterprise: bool) -> String {
    match platform {
        Platform::Linux => format!("linux_{bits}"),
        Platform::Osx => String::new(),
        _ if enterprise => "windows-64".to_owned(),
        _ => "2008plus-ssl".to_owned(),
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests fail fast with a message naming the broken fixture"
)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn linux_host() -> HostPlatform {
        HostPlatform::new("linux", "x64")
    }

    fn request(platform: &str) -> RequestOptions {
        RequestOptions {
            platform: Some(platform.to_owned()),
            ..RequestOptions::for_version("3.0.7")
        }
    }

    #[rstest]
    fn defaults_come_from_host_and_constants(linux_host: HostPlatform) {
        let options = normalize(&RequestOptions::for_version("latest"), &linux_host);

        assert_eq!(options.platform(), &Platform::Linux);
        assert_eq!(options.arch(), "x86_64");
        assert_eq!(options.bits(), "64");
        assert_eq!(options.branch(), "master");
        assert!(!options.debug());
        assert!(!options.enterprise());
    }

    #[rstest]
    fn darwin_host_defaults_to_osx() {
        let host = HostPlatform::new("darwin", "x64");
        let options = normalize(&RequestOptions::for_version("latest"), &host);
        assert_eq!(options.platform(), &Platform::Osx);
        assert_eq!(options.distro(), "");
        assert_eq!(options.separator(), "");
    }

    #[rstest]
    #[case::text_suffix(Bits::Text("64bit".to_owned()), "64")]
    #[case::number(Bits::Number(64), "64")]
    #[case::thirty_two(Bits::Text("32-bit".to_owned()), "32")]
    #[case::no_digits(Bits::Text("bits".to_owned()), "")]
    fn bits_are_reduced_to_digits(
        linux_host: HostPlatform,
        #[case] bits: Bits,
        #[case] expected: &str,
    ) {
        let raw = RequestOptions {
            bits: Some(bits),
            ..RequestOptions::for_version("latest")
        };
        assert_eq!(normalize(&raw, &linux_host).bits(), expected);
    }

    #[rstest]
    #[case::linux("linux", false, false, "linux_64")]
    #[case::linux_debug("linux", false, true, "linux_64_debug")]
    #[case::osx("darwin", false, false, "")]
    #[case::osx_debug("osx", false, true, "_debug")]
    #[case::windows("windows", false, false, "2008plus-ssl")]
    #[case::windows_enterprise("win32", true, false, "windows-64")]
    #[case::windows_enterprise_debug("win32", true, true, "windows-64_debug")]
    #[case::other_platform("sunos", false, false, "2008plus-ssl")]
    #[case::other_enterprise("sunos", true, false, "windows-64")]
    #[case::miscased_linux("Linux", false, false, "2008plus-ssl")]
    fn distro_is_derived_from_platform(
        linux_host: HostPlatform,
        #[case] platform: &str,
        #[case] enterprise: bool,
        #[case] debug: bool,
        #[case] expected: &str,
    ) {
        let raw = RequestOptions {
            enterprise,
            debug,
            ..request(platform)
        };
        assert_eq!(normalize(&raw, &linux_host).distro(), expected);
    }

    #[rstest]
    fn explicit_distro_is_kept_verbatim(linux_host: HostPlatform) {
        let raw = RequestOptions {
            distro: Some("rhel70".to_owned()),
            debug: true,
            ..request("linux")
        };
        assert_eq!(normalize(&raw, &linux_host).distro(), "rhel70");
    }

    #[rstest]
    fn empty_distro_counts_as_absent(linux_host: HostPlatform) {
        let raw = RequestOptions {
            distro: Some(String::new()),
            ..request("linux")
        };
        assert_eq!(normalize(&raw, &linux_host).distro(), "linux_64");
    }

    #[rstest]
    #[case("win32", ".zip", "-")]
    #[case("windows", ".zip", "-")]
    #[case("linux", ".tgz", "-")]
    #[case("osx", ".tgz", "")]
    fn extension_and_separator_follow_platform(
        linux_host: HostPlatform,
        #[case] platform: &str,
        #[case] extension: &str,
        #[case] separator: &str,
    ) {
        let options = normalize(&request(platform), &linux_host);
        assert_eq!(options.extension().as_str(), extension);
        assert_eq!(options.separator(), separator);
    }

    #[rstest]
    #[case(request("linux"))]
    #[case(RequestOptions { debug: true, ..request("osx") })]
    #[case(RequestOptions { enterprise: true, debug: true, ..request("windows") })]
    #[case(RequestOptions { bits: Some(Bits::Text("32bit".to_owned())), ..request("linux") })]
    #[case(RequestOptions::for_version("stable"))]
    fn normalisation_is_idempotent(linux_host: HostPlatform, #[case] raw: RequestOptions) {
        let once = normalize(&raw, &linux_host);
        let other_host = HostPlatform::new("darwin", "arm64");
        let twice = normalize(&once.to_request(), &other_host);
        assert_eq!(once, twice);
    }

    #[test]
    fn bits_deserialise_from_number_or_string() {
        let numeric: RequestOptions =
            serde_json::from_str(r#"{"version":"latest","bits":64}"#).expect("numeric bits");
        let text: RequestOptions =
            serde_json::from_str(r#"{"version":"latest","bits":"64bit"}"#).expect("text bits");

        assert_eq!(numeric.bits, Some(Bits::Number(64)));
        assert_eq!(text.bits, Some(Bits::Text("64bit".to_owned())));
    }

    #[test]
    fn request_rejects_unknown_fields() {
        let result = serde_json::from_str::<RequestOptions>(r#"{"version":"latest","os":"linux"}"#);
        assert!(result.is_err());
    }
}
