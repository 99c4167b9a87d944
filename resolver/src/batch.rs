//! Concurrent resolution of independent requests.
//!
//! Requests are keyed by their version selector. Each unique selector is
//! resolved on its own scoped thread; a failure lands in that selector's
//! slot and never affects its siblings. That includes a worker that panics
//! and a thread the OS refuses to start. Two requests sharing a selector
//! collide: the later one replaces the earlier before anything runs.

use crate::error::{ResolveError, Result};
use crate::naming::ArtifactDescriptor;
use crate::options::RequestOptions;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::thread;

/// Per-selector outcomes of a batch.
pub type BatchResults = BTreeMap<String, Result<ArtifactDescriptor>>;

/// Resolve every request concurrently with `resolve_one`.
///
/// Blocks until all workers finish; there is no cancellation.
///
/// # Examples
///
/// ```
/// use mongodb_download_url::batch::resolve_all;
/// use mongodb_download_url::naming::ArtifactDescriptor;
/// use mongodb_download_url::options::RequestOptions;
///
/// let requests = vec![RequestOptions::for_version("a"), RequestOptions::for_version("b")];
/// let results = resolve_all(&requests, |request| {
///     Ok(ArtifactDescriptor::new(&request.version, "file", "url"))
/// });
///
/// assert_eq!(results.len(), 2);
/// assert!(results["a"].is_ok());
/// ```
pub fn resolve_all<F>(requests: &[RequestOptions], resolve_one: F) -> BatchResults
where
    F: Fn(&RequestOptions) -> Result<ArtifactDescriptor> + Sync,
{
    let tasks = dispatch_map(requests);
    debug!("resolving batch of {} requests", tasks.len());
    let resolve_one = &resolve_one;

    thread::scope(|scope| {
        let workers: Vec<_> = tasks
            .into_iter()
            .map(|(selector, request)| {
                let worker =
                    thread::Builder::new().spawn_scoped(scope, move || resolve_one(request));
                (selector, worker)
            })
            .collect();

        workers
            .into_iter()
            .map(|(selector, worker)| {
                let outcome = match worker {
                    Ok(handle) => handle.join().unwrap_or_else(|_| {
                        Err(ResolveError::WorkerPanicked {
                            selector: selector.to_owned(),
                        })
                    }),
                    Err(source) => {
                        warn!("could not start worker for `{selector}`: {source}");
                        Err(ResolveError::WorkerSpawn {
                            selector: selector.to_owned(),
                            source,
                        })
                    }
                };
                (selector.to_owned(), outcome)
            })
            .collect()
    })
}

/// Key requests by selector, letting later duplicates win.
fn dispatch_map(requests: &[RequestOptions]) -> BTreeMap<&str, &RequestOptions> {
    let mut tasks = BTreeMap::new();
    for request in requests {
        if tasks.insert(request.version.as_str(), request).is_some() {
            warn!(
                "duplicate selector `{}` in batch; keeping the last request",
                request.version
            );
        }
    }
    tasks
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests fail fast with a message naming the broken fixture"
)]
mod tests {
    use super::*;
    use crate::http::FetchError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Condvar, Mutex};
    use std::time::Duration;

    fn echo(request: &RequestOptions) -> Result<ArtifactDescriptor> {
        let platform = request.platform.clone().unwrap_or_default();
        Ok(ArtifactDescriptor::new(&request.version, platform, "url"))
    }

    fn request(version: &str, platform: &str) -> RequestOptions {
        RequestOptions {
            platform: Some(platform.to_owned()),
            ..RequestOptions::for_version(version)
        }
    }

    #[test]
    fn every_request_gets_its_own_slot() {
        let requests = vec![
            request("3.0.7", "linux"),
            request("3.2.0", "osx"),
            request("latest", "win32"),
        ];
        let results = resolve_all(&requests, echo);

        assert_eq!(results.len(), 3);
        for request in &requests {
            let descriptor = results[&request.version].as_ref().expect("resolved");
            assert_eq!(descriptor.version(), request.version);
            assert_eq!(
                Some(descriptor.artifact()),
                request.platform.as_deref()
            );
        }
    }

    #[test]
    fn failures_are_isolated() {
        let requests = vec![request("good", "linux"), request("bad", "linux")];
        let results = resolve_all(&requests, |request| {
            if request.version == "bad" {
                Err(ResolveError::Upstream(FetchError::Http {
                    url: "http://feed.test".to_owned(),
                    reason: "boom".to_owned(),
                }))
            } else {
                echo(request)
            }
        });

        assert!(results["good"].is_ok());
        assert!(results["bad"].as_ref().is_err_and(ResolveError::is_upstream));
    }

    #[test]
    fn duplicate_selectors_keep_the_last_request() {
        let requests = vec![request("3.0.7", "linux"), request("3.0.7", "osx")];
        let calls = AtomicUsize::new(0);
        let results = resolve_all(&requests, |request| {
            calls.fetch_add(1, Ordering::SeqCst);
            echo(request)
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(results.len(), 1);
        let descriptor = results["3.0.7"].as_ref().expect("resolved");
        assert_eq!(descriptor.artifact(), "osx");
    }

    #[test]
    fn panicking_worker_is_reported_in_its_slot() {
        let requests = vec![request("ok", "linux"), request("explode", "linux")];
        let results = resolve_all(&requests, |request| {
            assert_ne!(request.version, "explode", "worker failure");
            echo(request)
        });

        assert!(results["ok"].is_ok());
        assert!(matches!(
            results["explode"],
            Err(ResolveError::WorkerPanicked { .. })
        ));
    }

    #[test]
    fn requests_are_resolved_concurrently() {
        let requests: Vec<_> = ["3.0.7", "3.2.0", "latest", "stable"]
            .into_iter()
            .map(|version| request(version, "linux"))
            .collect();
        let total = requests.len();
        let arrived = Mutex::new(0_usize);
        let all_arrived = Condvar::new();

        let results = resolve_all(&requests, |request| {
            let mut count = arrived.lock().expect("arrival lock");
            *count += 1;
            all_arrived.notify_all();
            let (_count, wait) = all_arrived
                .wait_timeout_while(count, Duration::from_secs(10), |count| *count < total)
                .expect("arrival lock");
            assert!(!wait.timed_out(), "workers did not overlap");
            echo(request)
        });

        assert_eq!(results.len(), total);
        for (selector, outcome) in &results {
            assert!(outcome.is_ok(), "{selector}: {outcome:?}");
        }
    }

    #[test]
    fn empty_batch_yields_empty_results() {
        let results = resolve_all(&[], echo);
        assert!(results.is_empty());
    }
}
