//! Platform vocabulary and host defaults.
//!
//! MongoDB release archives use Node-style platform names (`linux`, `osx`,
//! `win32`). Requests may spell them differently (`darwin`, `windows`), so
//! every platform string passes through [`Platform::canonical`] before it
//! reaches the naming rules.
//!
//! Host defaults are an explicit [`HostPlatform`] value handed to the
//! normaliser rather than process-wide state, so resolution can be
//! exercised for any simulated host.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A canonical release platform.
///
/// # Examples
///
/// ```
/// use mongodb_download_url::platform::Platform;
///
/// assert_eq!(Platform::canonical("darwin"), Platform::Osx);
/// assert_eq!(Platform::canonical("windows"), Platform::Win32);
/// assert_eq!(Platform::canonical("sunos").as_str(), "sunos");
/// assert_eq!(Platform::canonical("Linux").as_str(), "Linux");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    /// Linux builds.
    Linux,
    /// macOS builds (published as `osx`).
    Osx,
    /// Windows builds (published as `win32`).
    Win32,
    /// Any other platform name, kept verbatim.
    Other(String),
}

impl Platform {
    /// Canonicalise a platform name, applying the `darwin` and `windows`
    /// aliases.
    ///
    /// Matching is exact: `Linux` is not `linux` and stays an
    /// [`Platform::Other`] value.
    #[must_use]
    pub fn canonical(name: &str) -> Self {
        match name {
            "linux" => Self::Linux,
            "osx" | "darwin" => Self::Osx,
            "win32" | "windows" => Self::Win32,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Map a Rust target OS name (`std::env::consts::OS`) to a platform.
    ///
    /// # Examples
    ///
    /// ```
    /// use mongodb_download_url::platform::Platform;
    ///
    /// assert_eq!(Platform::from_target_os("macos"), Platform::Osx);
    /// assert_eq!(Platform::from_target_os("windows"), Platform::Win32);
    /// ```
    #[must_use]
    pub fn from_target_os(os: &str) -> Self {
        match os {
            "macos" => Self::Osx,
            other => Self::canonical(other),
        }
    }

    /// Return the published platform name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Linux => "linux",
            Self::Osx => "osx",
            Self::Win32 => "win32",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        Self::canonical(&value)
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonicalise an architecture name (`x64` becomes `x86_64`).
#[must_use]
pub fn canonical_arch(arch: &str) -> String {
    match arch.trim() {
        "x64" => "x86_64".to_owned(),
        other => other.to_owned(),
    }
}

/// The platform and architecture used when a request omits them.
///
/// # Examples
///
/// ```
/// use mongodb_download_url::platform::{HostPlatform, Platform};
///
/// let host = HostPlatform::new("darwin", "x64");
/// assert_eq!(host.platform(), &Platform::Osx);
/// assert_eq!(host.arch(), "x86_64");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    platform: Platform,
    arch: String,
}

impl HostPlatform {
    /// Describe a host from raw platform and architecture names.
    #[must_use]
    pub fn new(platform: &str, arch: &str) -> Self {
        Self {
            platform: Platform::canonical(platform),
            arch: canonical_arch(arch),
        }
    }

    /// Describe the machine this process runs on.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            platform: Platform::from_target_os(std::env::consts::OS),
            arch: canonical_arch(std::env::consts::ARCH),
        }
    }

    /// Return the default platform.
    #[must_use]
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Return the default architecture.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }
}

impl Default for HostPlatform {
    fn default() -> Self {
        Self::detect()
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

    #[rstest]
    #[case::darwin("darwin", Platform::Osx)]
    #[case::osx("osx", Platform::Osx)]
    #[case::windows("windows", Platform::Win32)]
    #[case::win32("win32", Platform::Win32)]
    #[case::linux("linux", Platform::Linux)]
    #[case::other("freebsd", Platform::Other("freebsd".to_owned()))]
    fn canonical_applies_aliases(#[case] input: &str, #[case] expected: Platform) {
        assert_eq!(Platform::canonical(input), expected);
    }

    #[rstest]
    #[case::upper_linux("Linux")]
    #[case::upper_darwin("Darwin")]
    #[case::macos("macos")]
    #[case::padded(" linux")]
    fn canonical_matches_names_exactly(#[case] input: &str) {
        assert_eq!(Platform::canonical(input), Platform::Other(input.to_owned()));
    }

    #[rstest]
    #[case::macos("macos", Platform::Osx)]
    #[case::windows("windows", Platform::Win32)]
    #[case::linux("linux", Platform::Linux)]
    #[case::freebsd("freebsd", Platform::Other("freebsd".to_owned()))]
    fn target_os_names_map_to_platforms(#[case] os: &str, #[case] expected: Platform) {
        assert_eq!(Platform::from_target_os(os), expected);
    }

    #[test]
    fn canonical_is_stable_under_repetition() {
        for name in ["darwin", "windows", "linux", "sunos", "Linux"] {
            let once = Platform::canonical(name);
            assert_eq!(Platform::canonical(once.as_str()), once);
        }
    }

    #[rstest]
    #[case("x64", "x86_64")]
    #[case("x86_64", "x86_64")]
    #[case("aarch64", "aarch64")]
    fn arch_mapping(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(canonical_arch(input), expected);
    }

    #[test]
    fn detect_uses_canonical_names() {
        let host = HostPlatform::detect();
        assert_ne!(host.platform().as_str(), "darwin");
        assert_ne!(host.platform().as_str(), "macos");
        assert_ne!(host.platform().as_str(), "windows");
        assert_ne!(host.arch(), "x64");
    }

    #[test]
    fn platform_serialises_as_plain_string() {
        let json = serde_json::to_string(&Platform::Win32).expect("serialise");
        assert_eq!(json, "\"win32\"");
        let parsed: Platform = serde_json::from_str("\"darwin\"").expect("deserialise");
        assert_eq!(parsed, Platform::Osx);
    }
}
