//! CLI argument definitions for the download URL resolver.
//!
//! Kept apart from the binary so argument parsing can be tested without
//! touching the network.

use crate::config::ConfigError;
use crate::error::ResolveError;
use crate::options::{Bits, RequestOptions};
use camino::Utf8PathBuf;
use clap::Parser;
use thiserror::Error;

/// Selector used when none is given.
pub const DEFAULT_SELECTOR: &str = "latest";

/// Value of `--request` that reads the request from standard input.
pub const STDIN_MARKER: &str = "-";

/// Resolve the download URL of a MongoDB release.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "mongodb-download-url")]
#[command(version, about)]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Latest release for this machine:\n",
    "    $ mongodb-download-url\n\n",
    "  Newest 3.0 release for Windows, enterprise edition:\n",
    "    $ mongodb-download-url 3.0.x --platform win32 --enterprise\n\n",
    "  CI build of a commit:\n",
    "    $ mongodb-download-url 0123456789abcdef0123456789abcdef01234567 --branch v3.0\n\n",
    "  Batch request from a file:\n",
    "    $ mongodb-download-url --request requests.json --json",
))]
pub struct Cli {
    /// Version selector: `latest`, `stable`, a version range, or a commit hash.
    #[arg(id = "selector", value_name = "VERSION", conflicts_with = "request")]
    pub version: Option<String>,

    /// Target platform (linux, osx, win32, ...) [default: this host].
    #[arg(long, value_name = "PLATFORM")]
    pub platform: Option<String>,

    /// Target architecture [default: this host].
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Bit width, e.g. `64` or `64bit`.
    #[arg(long, value_name = "BITS")]
    pub bits: Option<String>,

    /// CI branch for commit selectors.
    #[arg(long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Explicit distribution tag.
    #[arg(long, value_name = "DISTRO")]
    pub distro: Option<String>,

    /// Resolve the enterprise edition.
    #[arg(long)]
    pub enterprise: bool,

    /// Resolve the debug-symbols archive.
    #[arg(long)]
    pub debug: bool,

    /// Configuration file [default: platform config directory].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Print the full descriptor as JSON instead of the bare URL.
    #[arg(long)]
    pub json: bool,

    /// Read a JSON request (selector, object, or array) from FILE, or `-`
    /// for standard input.
    #[arg(long, value_name = "FILE")]
    pub request: Option<String>,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(short, long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl Cli {
    /// Build request options from the positional selector and flags.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use mongodb_download_url::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["mongodb-download-url", "3.0.x", "--bits", "64bit"]);
    /// let request = cli.to_request();
    /// assert_eq!(request.version, "3.0.x");
    /// assert!(request.bits.is_some());
    /// ```
    #[must_use]
    pub fn to_request(&self) -> RequestOptions {
        RequestOptions {
            version: self
                .version
                .clone()
                .unwrap_or_else(|| DEFAULT_SELECTOR.to_owned()),
            platform: self.platform.clone(),
            arch: self.arch.clone(),
            bits: self.bits.as_deref().map(Bits::from),
            branch: self.branch.clone(),
            distro: self.distro.clone(),
            enterprise: self.enterprise,
            debug: self.debug,
        }
    }

    /// Whether the request comes from standard input.
    #[must_use]
    pub fn reads_stdin(&self) -> bool {
        self.request.as_deref() == Some(STDIN_MARKER)
    }
}

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The request file could not be read.
    #[error("failed to read request from {path}")]
    RequestRead {
        /// File name, or `-` for standard input.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The request text matches no accepted shape.
    #[error("invalid request: {0}")]
    RequestParse(#[from] serde_json::Error),

    /// Output could not be written.
    #[error("failed to write output")]
    Write(#[source] std::io::Error),

    /// At least one batch entry failed.
    #[error("{failed} of {total} batch requests failed")]
    BatchFailed {
        /// Number of failed entries.
        failed: usize,
        /// Number of entries in the batch.
        total: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["mongodb-download-url"]);
        assert!(cli.version.is_none());
        assert!(cli.config.is_none());
        assert!(cli.request.is_none());
        assert!(!cli.json);
        assert_eq!(cli.verbosity, 0);

        let request = cli.to_request();
        assert_eq!(request, RequestOptions::for_version(DEFAULT_SELECTOR));
    }

    #[test]
    fn cli_maps_flags_to_request() {
        let cli = Cli::parse_from([
            "mongodb-download-url",
            "3.0.7",
            "--platform",
            "darwin",
            "--arch",
            "x64",
            "--bits",
            "64bit",
            "--branch",
            "v3.0",
            "--distro",
            "rhel70",
            "--enterprise",
            "--debug",
        ]);
        let request = cli.to_request();

        assert_eq!(request.version, "3.0.7");
        assert_eq!(request.platform.as_deref(), Some("darwin"));
        assert_eq!(request.arch.as_deref(), Some("x64"));
        assert_eq!(request.bits, Some(Bits::Text("64bit".to_owned())));
        assert_eq!(request.branch.as_deref(), Some("v3.0"));
        assert_eq!(request.distro.as_deref(), Some("rhel70"));
        assert!(request.enterprise);
        assert!(request.debug);
    }

    #[rstest]
    #[case::single(&["mongodb-download-url", "-v"], 1)]
    #[case::triple(&["mongodb-download-url", "-vvv"], 3)]
    #[case::long(&["mongodb-download-url", "--verbose", "--verbose"], 2)]
    fn cli_counts_verbosity(#[case] args: &[&str], #[case] expected: u8) {
        let cli = Cli::parse_from(args);
        assert_eq!(cli.verbosity, expected);
    }

    #[test]
    fn cli_detects_stdin_request() {
        let cli = Cli::parse_from(["mongodb-download-url", "--request", "-"]);
        assert!(cli.reads_stdin());

        let cli = Cli::parse_from(["mongodb-download-url", "--request", "batch.json"]);
        assert!(!cli.reads_stdin());
    }

    #[test]
    fn cli_rejects_selector_with_request_file() {
        let result = Cli::try_parse_from(["mongodb-download-url", "latest", "--request", "x.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_config_path() {
        let cli = Cli::parse_from(["mongodb-download-url", "-c", "/tmp/resolver.toml"]);
        assert_eq!(cli.config, Some(Utf8PathBuf::from("/tmp/resolver.toml")));
    }
}
