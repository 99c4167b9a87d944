//! Behaviour-driven tests for end-to-end download URL resolution.
//!
//! Scenarios run the full pipeline (normalisation, version selection, and
//! naming) over in-memory catalog and CI providers. Tests use the
//! rstest-bdd v0.5.0 mutable world pattern.
#![expect(
    clippy::expect_used,
    reason = "steps fail fast when an earlier step left the world incomplete"
)]

use mongodb_download_url::batch::BatchResults;
use mongodb_download_url::error::ResolveError;
use mongodb_download_url::naming::ArtifactNamer;
use mongodb_download_url::platform::HostPlatform;
use mongodb_download_url::testing::{StaticCatalog, StaticRevisions};
use mongodb_download_url::{ArtifactDescriptor, DownloadUrlResolver, RequestOptions};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ResolutionWorld {
    host: Option<HostPlatform>,
    catalog: Option<StaticCatalog>,
    revisions: StaticRevisions,
    request: RequestOptions,
    outcome: Option<Result<ArtifactDescriptor, ResolveError>>,
    batch: Option<BatchResults>,
}

impl ResolutionWorld {
    fn resolver(&self) -> DownloadUrlResolver {
        DownloadUrlResolver::with_providers(
            self.host.clone().expect("host set"),
            ArtifactNamer::default(),
            Box::new(self.catalog.clone().expect("catalog set")),
            Box::new(self.revisions.clone()),
        )
    }

    fn descriptor(&self) -> &ArtifactDescriptor {
        self.outcome
            .as_ref()
            .expect("outcome set")
            .as_ref()
            .expect("resolution succeeded")
    }

    fn error(&self) -> &ResolveError {
        self.outcome
            .as_ref()
            .expect("outcome set")
            .as_ref()
            .expect_err("resolution failed")
    }

    fn batch_entry(&self, selector: &str) -> &Result<ArtifactDescriptor, ResolveError> {
        self.batch
            .as_ref()
            .expect("batch set")
            .get(selector)
            .expect("selector present in batch")
    }
}

#[fixture]
fn world() -> ResolutionWorld {
    ResolutionWorld::default()
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',').map(|item| item.trim().to_owned()).collect()
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("a linux host")]
fn given_linux_host(world: &mut ResolutionWorld) {
    world.host = Some(HostPlatform::new("linux", "x64"));
}

#[given("a release catalog listing \"{versions}\"")]
fn given_release_catalog(world: &mut ResolutionWorld, versions: String) {
    world.catalog = Some(StaticCatalog::new(split_list(&versions)));
}

#[given("an unreachable release catalog")]
fn given_unreachable_catalog(world: &mut ResolutionWorld) {
    world.catalog = Some(StaticCatalog::unreachable());
}

#[given("a CI revision \"{commit}\" on branch \"{branch}\" with build \"{build}\"")]
fn given_ci_revision(world: &mut ResolutionWorld, commit: String, branch: String, build: String) {
    world.revisions = std::mem::take(&mut world.revisions).with_revision(&branch, &commit, [build]);
}

#[given("the target platform \"{platform}\"")]
fn given_target_platform(world: &mut ResolutionWorld, platform: String) {
    world.request.platform = Some(platform);
}

#[given("the enterprise edition")]
fn given_enterprise(world: &mut ResolutionWorld) {
    world.request.enterprise = true;
}

#[given("debug symbols")]
fn given_debug(world: &mut ResolutionWorld) {
    world.request.debug = true;
}

#[when("the selector \"{selector}\" is resolved")]
fn when_selector_resolved(world: &mut ResolutionWorld, selector: String) {
    world.request.version = selector;
    world.outcome = Some(world.resolver().resolve(&world.request));
}

#[when("the selectors \"{selectors}\" are resolved as a batch")]
fn when_batch_resolved(world: &mut ResolutionWorld, selectors: String) {
    let requests: Vec<RequestOptions> = split_list(&selectors)
        .into_iter()
        .map(RequestOptions::for_version)
        .collect();
    world.batch = Some(world.resolver().resolve_all(&requests));
}

#[then("the resolved version is \"{version}\"")]
fn then_resolved_version(world: &mut ResolutionWorld, version: String) {
    assert_eq!(world.descriptor().version(), version);
}

#[then("the artifact is \"{artifact}\"")]
fn then_artifact(world: &mut ResolutionWorld, artifact: String) {
    assert_eq!(world.descriptor().artifact(), artifact);
}

#[then("the download URL is \"{url}\"")]
fn then_download_url(world: &mut ResolutionWorld, url: String) {
    assert_eq!(world.descriptor().url(), url);
}

#[then("resolution fails because no version matched")]
fn then_not_found(world: &mut ResolutionWorld) {
    assert!(
        matches!(world.error(), ResolveError::NotFound { .. }),
        "unexpected error: {}",
        world.error()
    );
}

#[then("resolution fails with an upstream error")]
fn then_upstream_error(world: &mut ResolutionWorld) {
    assert!(world.error().is_upstream(), "unexpected error: {}", world.error());
}

#[then("resolution fails with the message \"{message}\"")]
fn then_error_message(world: &mut ResolutionWorld, message: String) {
    assert_eq!(world.error().to_string(), message);
}

#[then("the batch holds {count} results")]
fn then_batch_size(world: &mut ResolutionWorld, count: usize) {
    assert_eq!(world.batch.as_ref().expect("batch set").len(), count);
}

#[then("batch entry \"{selector}\" resolves to \"{version}\"")]
fn then_batch_entry_resolves(world: &mut ResolutionWorld, selector: String, version: String) {
    let descriptor = world
        .batch_entry(&selector)
        .as_ref()
        .expect("batch entry succeeded");
    assert_eq!(descriptor.version(), version);
}

#[then("batch entry \"{selector}\" failed")]
fn then_batch_entry_failed(world: &mut ResolutionWorld, selector: String) {
    assert!(world.batch_entry(&selector).is_err());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/resolution.feature",
    name = "Latest selects the newest catalog entry"
)]
fn scenario_latest(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "Stable skips prereleases and odd minor versions"
)]
fn scenario_stable(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "A range picks its first match in catalog order"
)]
fn scenario_range(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "An unmatched range is reported"
)]
fn scenario_unmatched_range(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "An invalid range matches nothing"
)]
fn scenario_invalid_range(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "An invalid range still reports an unreachable catalog"
)]
fn scenario_invalid_range_unreachable_catalog(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "Enterprise debug archives for Windows"
)]
fn scenario_enterprise_debug_windows(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "macOS archives carry no distro"
)]
fn scenario_macos(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "An unreachable catalog is an upstream failure"
)]
fn scenario_unreachable_catalog(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "A commit hash resolves to its CI build"
)]
fn scenario_commit(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "An unknown commit surfaces the CI message"
)]
fn scenario_unknown_commit(world: ResolutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/resolution.feature",
    name = "A batch isolates failing selectors"
)]
fn scenario_batch(world: ResolutionWorld) {
    let _ = world;
}
