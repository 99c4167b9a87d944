//! Error types for release resolution.
//!
//! Every failure reaches the caller of the resolution it belongs to. There
//! is no fallback version selection: an unmatched request is reported, not
//! silently replaced.

use crate::http::FetchError;
use thiserror::Error;

/// Errors that can occur while resolving a release request.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The release catalog or the CI API could not be queried.
    ///
    /// The upstream error is shown verbatim; for unknown CI revisions this
    /// is the API's own message.
    #[error(transparent)]
    Upstream(#[from] FetchError),

    /// No catalog entry satisfies the request.
    #[error("could not find a MongoDB version matching `{request}`")]
    NotFound {
        /// The normalised request, rendered as JSON.
        request: String,
    },

    /// The CI manifest lists no build for the requested branch and distro.
    #[error("no CI build matching `{fragment}` for revision {commit}")]
    LookupMismatch {
        /// The commit that was looked up.
        commit: String,
        /// The substring no build name contained.
        fragment: String,
    },

    /// A batch worker thread could not be started.
    #[error("could not start resolution of `{selector}`")]
    WorkerSpawn {
        /// The selector the worker would have resolved.
        selector: String,
        /// The error reported by the OS.
        #[source]
        source: std::io::Error,
    },

    /// A batch worker terminated without producing a result.
    #[error("resolution of `{selector}` terminated unexpectedly")]
    WorkerPanicked {
        /// The selector the worker was resolving.
        selector: String,
    },
}

impl ResolveError {
    /// Whether the failure came from an upstream service.
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }
}

/// Result type alias using [`ResolveError`].
pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests fail fast with a message naming the broken fixture"
)]
mod tests {
    use super::*;

    #[test]
    fn not_found_embeds_the_request() {
        let err = ResolveError::NotFound {
            request: r#"{"version":"9.9.9"}"#.to_owned(),
        };
        assert_eq!(
            err.to_string(),
            r#"could not find a MongoDB version matching `{"version":"9.9.9"}`"#
        );
    }

    #[test]
    fn upstream_passes_message_through() {
        let err = ResolveError::from(FetchError::NotFound {
            url: "http://ci.test".to_owned(),
            message: "project not found".to_owned(),
        });
        assert!(err.is_upstream());
        assert_eq!(err.to_string(), "project not found");
    }

    #[test]
    fn lookup_mismatch_names_fragment() {
        let err = ResolveError::LookupMismatch {
            commit: "abc".to_owned(),
            fragment: "mongodb_mongo_master_linux_64".to_owned(),
        };
        assert!(err.to_string().contains("mongodb_mongo_master_linux_64"));
        assert!(!err.is_upstream());
    }

    #[test]
    fn worker_spawn_keeps_os_error_as_source() {
        let err = ResolveError::WorkerSpawn {
            selector: "3.0.x".to_owned(),
            source: std::io::Error::other("resource temporarily unavailable"),
        };
        assert_eq!(err.to_string(), "could not start resolution of `3.0.x`");
        let source = std::error::Error::source(&err).expect("source kept");
        assert_eq!(source.to_string(), "resource temporarily unavailable");
    }
}
