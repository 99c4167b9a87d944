//! Blocking HTTP transport shared by the release catalog and CI lookups.
//!
//! Both upstream providers issue a single GET per resolution and inspect the
//! status code themselves (the CI API reports missing revisions as a 404 with
//! a JSON `message` body), so the agent is configured not to turn non-2xx
//! statuses into transport errors.

use std::time::Duration;

/// Default network timeout for upstream lookups.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on response bodies; the full release feed is several
/// megabytes.
const BODY_LIMIT: u64 = 64 * 1024 * 1024;

/// Errors arising from upstream fetches.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be completed.
    #[error("request to {url} failed: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The upstream reported that the resource does not exist.
    ///
    /// The message is the upstream's own explanation and is shown verbatim.
    #[error("{message}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
        /// Message reported by the upstream.
        message: String,
    },

    /// The upstream answered with an unexpected status code.
    #[error("unexpected HTTP status {status} from {url}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The status code received.
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("malformed response from {url}: {reason}")]
    Decode {
        /// The URL that was requested.
        url: String,
        /// Description of the decoding failure.
        reason: String,
    },
}

/// A response reduced to what the providers inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as UTF-8.
    pub body: String,
}

impl HttpResponse {
    /// Whether the status code is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Thin wrapper over a `ureq` agent with the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    /// Build a client whose requests time out after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }

    /// Issue a GET request and read the whole body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] when the connection fails, times out, or
    /// the body cannot be read.
    pub fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        log::trace!("GET {url}");
        let mut response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .with_config()
            .limit(BODY_LIMIT)
            .read_to_string()
            .map_err(|e| FetchError::Http {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;
        log::trace!("GET {url} -> {status} ({} bytes)", body.len());
        Ok(HttpResponse { status, body })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

/// Map a ureq transport error to a [`FetchError`].
///
/// Status codes never arrive here; callers inspect [`HttpResponse::status`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> FetchError {
    FetchError::Http {
        url: url.to_owned(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn map_ureq_error_reports_transport_failures() {
        let err = ureq::Error::HostNotFound;
        let mapped = map_ureq_error("https://example.test/feed", &err);
        assert!(
            matches!(mapped, FetchError::Http { ref url, .. } if url == "https://example.test/feed"),
            "mapped: {mapped:?}"
        );
    }

    #[test]
    fn not_found_displays_upstream_message_verbatim() {
        let err = FetchError::NotFound {
            url: "https://example.test".to_owned(),
            message: "version not found".to_owned(),
        };
        assert_eq!(err.to_string(), "version not found");
    }

    #[rstest]
    #[case(200, true)]
    #[case(204, true)]
    #[case(301, false)]
    #[case(404, false)]
    #[case(500, false)]
    fn success_covers_2xx_only(#[case] status: u16, #[case] expected: bool) {
        let response = HttpResponse {
            status,
            body: String::new(),
        };
        assert_eq!(response.is_success(), expected);
    }
}
