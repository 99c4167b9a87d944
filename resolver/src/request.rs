//! Accepted request shapes and their responses.
//!
//! A request is a bare selector string, one options object, or an array of
//! options objects. Arrays are resolved as a batch keyed by `version`.

use crate::batch::BatchResults;
use crate::naming::ArtifactDescriptor;
use crate::options::RequestOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Any accepted request.
///
/// # Examples
///
/// ```
/// use mongodb_download_url::request::Request;
///
/// let single: Request = serde_json::from_str(r#""3.0.7""#).expect("selector");
/// assert!(matches!(single, Request::Selector(_)));
///
/// let batch: Request =
///     serde_json::from_str(r#"[{"version":"3.0.7"},{"version":"latest","platform":"win32"}]"#)
///         .expect("batch");
/// assert!(matches!(batch, Request::Batch(ref items) if items.len() == 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Request {
    /// A bare version selector.
    Selector(String),
    /// One options object.
    Single(RequestOptions),
    /// Several independent options objects.
    Batch(Vec<RequestOptions>),
}

impl Request {
    /// Parse a request from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the text matches no accepted shape.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// The result of handling a [`Request`].
#[derive(Debug)]
pub enum Response {
    /// Descriptor for a selector or single options object.
    Single(ArtifactDescriptor),
    /// Per-selector outcomes of a batch.
    Batch(BatchResults),
}

/// One batch slot as rendered in JSON output.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchSlot<'a> {
    /// A resolved descriptor.
    Resolved(&'a ArtifactDescriptor),
    /// A failure message.
    Failed {
        /// The error text.
        error: String,
    },
}

/// Render batch results as a serialisable map.
#[must_use]
pub fn batch_slots(results: &BatchResults) -> BTreeMap<&str, BatchSlot<'_>> {
    results
        .iter()
        .map(|(selector, outcome)| {
            let slot = match outcome {
                Ok(descriptor) => BatchSlot::Resolved(descriptor),
                Err(err) => BatchSlot::Failed {
                    error: err.to_string(),
                },
            };
            (selector.as_str(), slot)
        })
        .collect()
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests fail fast with a message naming the broken fixture"
)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use rstest::rstest;

    #[rstest]
    #[case(r#""stable""#)]
    #[case(r#"{"version":"stable","bits":"64bit","enterprise":true}"#)]
    #[case(r#"[{"version":"stable"}]"#)]
    fn accepts_all_request_shapes(#[case] json: &str) {
        assert!(Request::from_json(json).is_ok(), "rejected {json}");
    }

    #[test]
    fn single_object_keeps_its_fields() {
        let request = Request::from_json(r#"{"version":"3.0.7","platform":"darwin","debug":true}"#)
            .expect("single");
        let Request::Single(options) = request else {
            panic!("expected single options");
        };
        assert_eq!(options.platform.as_deref(), Some("darwin"));
        assert!(options.debug);
    }

    #[rstest]
    #[case("42")]
    #[case(r#"{"platform":"linux"}"#)]
    fn rejects_unknown_shapes(#[case] json: &str) {
        assert!(Request::from_json(json).is_err());
    }

    #[test]
    fn batch_slots_render_errors_as_messages() {
        let mut results = BatchResults::new();
        results.insert(
            "3.0.7".to_owned(),
            Ok(ArtifactDescriptor::new("3.0.7", "a.tgz", "http://x/a.tgz")),
        );
        results.insert(
            "9.9.9".to_owned(),
            Err(ResolveError::NotFound {
                request: "9.9.9".to_owned(),
            }),
        );

        let json = serde_json::to_value(batch_slots(&results)).expect("serialise");
        assert_eq!(json["3.0.7"]["url"], "http://x/a.tgz");
        assert_eq!(
            json["9.9.9"]["error"],
            "could not find a MongoDB version matching `9.9.9`"
        );
    }
}
