//! End-to-end resolution: normalise, resolve, name.
//!
//! [`DownloadUrlResolver`] owns the host defaults, the naming roots, and the
//! two upstream providers. It is `Sync`, so one instance serves every
//! worker of a batch.

use crate::batch::{self, BatchResults};
use crate::catalog::{HttpVersionCatalog, VersionCatalog};
use crate::config::ResolverConfig;
use crate::error::Result;
use crate::http::HttpClient;
use crate::naming::{ArtifactDescriptor, ArtifactNamer};
use crate::options::{RequestOptions, normalize};
use crate::platform::HostPlatform;
use crate::request::{Request, Response};
use crate::resolver::VersionResolver;
use crate::revision::{HttpRevisionLookup, RevisionLookup};
use log::debug;

/// Resolves requests into artifact descriptors.
pub struct DownloadUrlResolver {
    host: HostPlatform,
    namer: ArtifactNamer,
    catalog: Box<dyn VersionCatalog>,
    revisions: Box<dyn RevisionLookup>,
}

impl DownloadUrlResolver {
    /// Build a resolver backed by the HTTP providers named in `config`.
    #[must_use]
    pub fn from_config(config: &ResolverConfig) -> Self {
        let client = HttpClient::new(config.timeout());
        Self::with_providers(
            config.host_platform(),
            config.namer(),
            Box::new(HttpVersionCatalog::new(
                client.clone(),
                config.release_feed_url.clone(),
            )),
            Box::new(HttpRevisionLookup::new(client, config.ci_api_root.clone())),
        )
    }

    /// Build a resolver over explicit providers.
    #[must_use]
    pub fn with_providers(
        host: HostPlatform,
        namer: ArtifactNamer,
        catalog: Box<dyn VersionCatalog>,
        revisions: Box<dyn RevisionLookup>,
    ) -> Self {
        Self {
            host,
            namer,
            catalog,
            revisions,
        }
    }

    /// Resolve a single request.
    ///
    /// # Errors
    ///
    /// Returns the [`crate::error::ResolveError`] of whichever stage failed.
    pub fn resolve(&self, request: &RequestOptions) -> Result<ArtifactDescriptor> {
        let options = normalize(request, &self.host);
        debug!("assembled options {options:?}");
        let resolved =
            VersionResolver::new(self.catalog.as_ref(), self.revisions.as_ref()).resolve(&options)?;
        let descriptor = self.namer.name(&options, &resolved);
        debug!("url: {}", descriptor.url());
        Ok(descriptor)
    }

    /// Resolve independent requests concurrently.
    #[must_use]
    pub fn resolve_all(&self, requests: &[RequestOptions]) -> BatchResults {
        batch::resolve_all(requests, |request| self.resolve(request))
    }

    /// Resolve any accepted request shape.
    ///
    /// # Errors
    ///
    /// Single requests propagate their error; batch requests always succeed
    /// and carry per-selector errors inside the response.
    pub fn handle(&self, request: &Request) -> Result<Response> {
        match request {
            Request::Selector(selector) => self
                .resolve(&RequestOptions::for_version(selector.as_str()))
                .map(Response::Single),
            Request::Single(options) => self.resolve(options).map(Response::Single),
            Request::Batch(requests) => Ok(Response::Batch(self.resolve_all(requests))),
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
    use crate::catalog::{MockVersionCatalog, VersionList};
    use crate::error::ResolveError;
    use crate::revision::{BuildManifest, MockRevisionLookup};

    const COMMIT: &str = "0123456789abcdef0123456789abcdef01234567";

    fn resolver() -> DownloadUrlResolver {
        let mut catalog = MockVersionCatalog::new();
        catalog
            .expect_versions()
            .returning(|| Ok(VersionList::from(vec!["3.1.0", "3.0.7", "2.6.12"])));
        let mut revisions = MockRevisionLookup::new();
        revisions.expect_revision().returning(|_, _| {
            Ok(BuildManifest::new(vec![
                "mongodb_mongo_master_windows_64_2k8_0123_15".to_owned(),
            ]))
        });
        DownloadUrlResolver::with_providers(
            HostPlatform::new("linux", "x64"),
            ArtifactNamer::default(),
            Box::new(catalog),
            Box::new(revisions),
        )
    }

    #[test]
    fn resolves_selector_string() {
        let response = resolver()
            .handle(&Request::Selector("stable".to_owned()))
            .expect("stable resolves");
        let Response::Single(descriptor) = response else {
            panic!("expected single response");
        };
        assert_eq!(descriptor.version(), "3.0.7");
        assert_eq!(
            descriptor.url(),
            "http://fastdl.mongodb.org/linux/mongodb-linux-x86_64-linux_64-3.0.7.tgz"
        );
    }

    #[test]
    fn commit_on_windows_uses_ci_distro() {
        let request = RequestOptions {
            platform: Some("windows".to_owned()),
            ..RequestOptions::for_version(COMMIT)
        };
        let descriptor = resolver().resolve(&request).expect("commit resolves");
        assert_eq!(
            descriptor.artifact(),
            "binaries-mongodb_mongo_master_windows_64_2k8_0123_15.zip"
        );
        assert!(
            descriptor
                .url()
                .contains("/mongodb-mongo-master/windows_64_2k8/"),
            "url: {}",
            descriptor.url()
        );
    }

    #[test]
    fn commit_on_linux_without_build_fails() {
        let err = resolver()
            .resolve(&RequestOptions::for_version(COMMIT))
            .expect_err("no linux build");
        assert!(matches!(err, ResolveError::LookupMismatch { .. }));
    }

    #[test]
    fn batch_isolates_failures() {
        let requests = vec![
            RequestOptions::for_version("3.0.x"),
            RequestOptions::for_version("9.9.9"),
        ];
        let response = resolver()
            .handle(&Request::Batch(requests))
            .expect("batch always succeeds");
        let Response::Batch(results) = response else {
            panic!("expected batch response");
        };
        assert_eq!(results.len(), 2);
        assert_eq!(
            results["3.0.x"].as_ref().expect("resolved").version(),
            "3.0.7"
        );
        assert!(matches!(
            results["9.9.9"],
            Err(ResolveError::NotFound { .. })
        ));
    }
}
