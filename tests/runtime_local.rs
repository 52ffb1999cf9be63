// ABOUTME: Integration tests against the local Docker/Podman engine.
// ABOUTME: Skipped when no engine socket is found; serialized via test-group.

mod support;

use lookout::compat::{ApiVersion, EndpointSettings, EndpointSettingsMap};
use lookout::context::CheckContext;
use lookout::registry::HttpRegistry;
use lookout::runtime::{
    BollardRuntime, ContainerError, ContainerOps, ContainerSpec, ImageError, ImageOps,
    RuntimeInfo, connect_local,
};
use lookout::types::{ContainerId, ImageRef};
use lookout::update::{CheckError, UpdateChecker};
use std::collections::HashMap;
use std::time::Duration;

const TEST_IMAGE: &str = "alpine:latest";

/// Get local runtime, skipping test if unavailable.
async fn local_runtime() -> Option<BollardRuntime> {
    connect_local(None).await.ok()
}

/// Skip test if no local runtime available.
macro_rules! require_runtime {
    () => {
        match local_runtime().await {
            Some(rt) => rt,
            None => {
                eprintln!("Skipping test: no local container runtime found");
                return;
            }
        }
    };
}

async fn ensure_test_image(runtime: &BollardRuntime) -> ImageRef {
    let image_ref = ImageRef::parse(TEST_IMAGE).expect("valid image ref");
    if runtime.inspect_image(TEST_IMAGE).await.is_err() {
        runtime
            .pull_image(&image_ref, None)
            .await
            .expect("pull should succeed");
    }
    image_ref
}

fn registry() -> HttpRegistry {
    HttpRegistry::new(Duration::from_secs(10), Vec::new()).expect("registry client")
}

// =============================================================================
// RuntimeInfo Tests
// =============================================================================

#[test_group::group(engine)]
#[tokio::test]
async fn runtime_info() {
    support::init_tracing();
    let runtime = require_runtime!();

    let info = runtime.info().await.expect("should get runtime info");

    assert!(!info.name.is_empty(), "runtime name should not be empty");
    assert!(!info.version.is_empty(), "runtime version should not be empty");
    assert_eq!(info.api_version, runtime.api_version());
}

#[test_group::group(engine)]
#[tokio::test]
async fn runtime_ping() {
    let runtime = require_runtime!();
    runtime.ping().await.expect("ping should succeed");
}

#[test_group::group(engine)]
#[tokio::test]
async fn negotiated_api_version_is_parseable() {
    let runtime = require_runtime!();

    let version: ApiVersion = runtime
        .api_version()
        .parse()
        .expect("negotiated version should parse");
    assert!(version.components().len() >= 2, "{}", version);
}

// =============================================================================
// ImageOps Tests
// =============================================================================

#[test_group::group(engine)]
#[tokio::test]
async fn inspect_missing_image_is_not_found() {
    let runtime = require_runtime!();

    let err = runtime
        .inspect_image("this-image-definitely-does-not-exist-12345:v999")
        .await
        .unwrap_err();
    assert!(matches!(err, ImageError::NotFound(_)), "{:?}", err);
}

#[test_group::group(engine)]
#[tokio::test]
async fn pulled_image_is_listed_and_resolvable() {
    let runtime = require_runtime!();
    ensure_test_image(&runtime).await;

    let details = runtime
        .inspect_image(TEST_IMAGE)
        .await
        .expect("inspect should succeed");
    assert!(details.id.as_str().starts_with("sha256:"), "{}", details.id);

    let listed = runtime.list_images().await.expect("list should succeed");
    assert!(listed.iter().any(|i| i.id == details.id));

    let registry = registry();
    let checker = UpdateChecker::new(&runtime, &registry);
    let ids = checker
        .image_ids_for_ref(&CheckContext::new(), TEST_IMAGE)
        .await;
    assert_eq!(ids, vec![details.id]);
}

#[test_group::group(engine)]
#[tokio::test]
async fn check_reports_local_digest_for_pulled_image() {
    let runtime = require_runtime!();
    ensure_test_image(&runtime).await;

    let registry = registry();
    let checker = UpdateChecker::new(&runtime, &registry);
    let ctx = CheckContext::new().with_timeout(Duration::from_secs(30));
    let result = checker.check_image_needs_update(&ctx, TEST_IMAGE, None).await;

    assert!(result.local_digest.starts_with("sha256:"), "{:?}", result);
    // Offline hosts cannot reach the registry; that must stay inconclusive.
    match &result.error {
        None => assert!(result.checked_via_api),
        Some(CheckError::RemoteLookupFailed { .. }) => assert!(!result.needs_update),
        Some(other) => panic!("unexpected error: {}", other),
    }
}

// =============================================================================
// ContainerOps Tests
// =============================================================================

#[test_group::group(engine)]
#[tokio::test]
async fn create_container_with_endpoint_settings() {
    let runtime = require_runtime!();
    let image = ensure_test_image(&runtime).await;

    let mut endpoints = EndpointSettingsMap::new();
    endpoints.insert(
        "bridge".to_string(),
        EndpointSettings {
            mac_address: "02:42:ac:11:00:42".to_string(),
            ..Default::default()
        },
    );
    let spec = ContainerSpec {
        name: format!("lookout-test-{}", std::process::id()),
        image,
        env: HashMap::from([("LOOKOUT_TEST".to_string(), "1".to_string())]),
        labels: HashMap::from([("lookout.test".to_string(), "true".to_string())]),
        endpoints: Some(endpoints.clone()),
    };

    let id = runtime
        .create_container(&spec)
        .await
        .expect("create_container should succeed at any API version");

    let info = runtime
        .inspect_container(id.as_str())
        .await
        .expect("inspect_container should succeed");
    assert_eq!(info.id, id);
    assert_eq!(info.name, spec.name);
    assert!(info.image_id.as_str().starts_with("sha256:"));

    // The gate works on a copy.
    assert_eq!(spec.endpoints, Some(endpoints));

    runtime
        .remove_container(&id, true)
        .await
        .expect("remove_container should succeed");
}

#[test_group::group(engine)]
#[tokio::test]
async fn inspect_missing_container_is_not_found() {
    let runtime = require_runtime!();

    let err = runtime
        .inspect_container("lookout-no-such-container")
        .await
        .unwrap_err();
    assert!(matches!(err, ContainerError::NotFound(_)), "{:?}", err);
}

#[test_group::group(engine)]
#[tokio::test]
async fn remove_missing_container_is_not_found() {
    let runtime = require_runtime!();

    let err = runtime
        .remove_container(&ContainerId::new("lookout-no-such-container"), true)
        .await
        .unwrap_err();
    assert!(matches!(err, ContainerError::NotFound(_)), "{:?}", err);
}
