//! MongoDB download URL resolver.
//!
//! This crate turns a loose release request (a version selector plus
//! optional platform details) into the archive name and download URL of a
//! concrete MongoDB build. Selectors may be `latest`, `stable`, an npm-style
//! version range, or a 40-character commit hash naming a CI build. It backs
//! the `mongodb-download-url` CLI and can be used programmatically.
//!
//! # Modules
//!
//! - [`batch`] - Concurrent resolution of independent requests
//! - [`catalog`] - Release catalog retrieval and ordering
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Endpoint and host configuration loaded from TOML
//! - [`error`] - Resolution error types
//! - [`http`] - Blocking HTTP client for upstream queries
//! - [`naming`] - Archive naming and download URL construction
//! - [`options`] - Request options and their normalisation
//! - [`pipeline`] - End-to-end resolution over configured providers
//! - [`platform`] - Platform and architecture canonicalisation
//! - [`range`] - npm-style version range matching
//! - [`request`] - Accepted request and response shapes
//! - [`resolver`] - Version selection against catalog and CI
//! - [`revision`] - CI revision lookup
//! - [`selector`] - Version selector classification

pub mod batch;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod naming;
pub mod options;
pub mod pipeline;
pub mod platform;
pub mod range;
pub mod request;
pub mod resolver;
pub mod revision;
pub mod selector;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use naming::ArtifactDescriptor;
pub use options::RequestOptions;
pub use pipeline::DownloadUrlResolver;
