//! End-to-end probe and scale-down scenarios over the HTTP boundary.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use wakegate::cloud::{DesiredChange, PolicyTarget};
use wakegate::deactivate::StopMode;

mod common;

use common::{compute_target, database_target, gate_router, FakeControlPlane, StubProbe};

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn stop_request() -> Request<Body> {
    let envelope = r#"{
        "message": {"data": "c2NhbGUtZG93bg==", "messageId": "m-1"},
        "subscription": "projects/test-project/subscriptions/idle-timeout"
    }"#;
    Request::builder()
        .method("POST")
        .uri("/events/stop")
        .header("content-type", "application/json")
        .body(Body::from(envelope))
        .unwrap()
}

#[tokio::test]
async fn warm_database_reports_ready() {
    // Scenario A: DB connects and the liveness query verifies.
    let probe = Arc::new(StubProbe::ready());
    let control = Arc::new(FakeControlPlane::with_state("RUNNING", None));
    let router = gate_router(probe, control.clone(), compute_target(), StopMode::Stop);

    let response = router.oneshot(get("/startupz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
    assert_eq!(control.describe_count(), 0, "ready path never hits the control plane");
}

#[tokio::test]
async fn stopped_compute_instance_is_started() {
    // Scenario B: DB down, VM terminated. Start it, stay 503.
    let probe = Arc::new(StubProbe::down("connect timed out after 3s"));
    let control = Arc::new(FakeControlPlane::with_state("TERMINATED", None));
    let router = gate_router(probe, control.clone(), compute_target(), StopMode::Stop);

    let response = router.oneshot(get("/startupz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_string(response).await;
    assert!(body.contains("wp-db-vm"), "diagnostic names the resource: {body}");
    assert_eq!(control.applied(), vec![DesiredChange::Start]);
}

#[tokio::test]
async fn parked_database_gets_policy_change() {
    // Scenario C: runnable but policy NEVER, the drift a prior scale-down
    // leaves behind. Only a policy change releases it.
    let probe = Arc::new(StubProbe::down("connection refused"));
    let control = Arc::new(FakeControlPlane::with_state("RUNNABLE", Some("NEVER")));
    let router = gate_router(probe, control.clone(), database_target(), StopMode::Stop);

    let response = router.oneshot(get("/startupz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        control.applied(),
        vec![DesiredChange::SetActivationPolicy(PolicyTarget::Always)]
    );
}

#[tokio::test]
async fn running_database_with_policy_always_is_left_alone() {
    let probe = Arc::new(StubProbe::down("proxy not up yet"));
    let control = Arc::new(FakeControlPlane::with_state("RUNNABLE", Some("ALWAYS")));
    let router = gate_router(probe, control.clone(), database_target(), StopMode::Stop);

    let response = router.oneshot(get("/startupz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(control.applied().is_empty(), "no mutation for a healthy intent");
}

#[tokio::test]
async fn transitioning_resource_waits_idempotently() {
    let probe = Arc::new(StubProbe::down("down"));
    let control = Arc::new(FakeControlPlane::with_state("STAGING", None));
    let router = gate_router(probe, control.clone(), compute_target(), StopMode::Stop);

    // Overlapping orchestrator probes during a cold start.
    for _ in 0..3 {
        let response = router.clone().oneshot(get("/startupz")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
    assert!(control.applied().is_empty(), "wait rows dispatch nothing");
    assert_eq!(control.describe_count(), 3, "one get per invocation");
}

#[tokio::test]
async fn missing_configuration_is_fatal_before_any_network_call() {
    // Scenario D: required identity absent. 500, and neither the database
    // nor the control plane is touched.
    let probe = Arc::new(StubProbe::ready());
    let control = Arc::new(FakeControlPlane::with_state("RUNNING", None));
    let mut target = compute_target();
    target.project.clear();
    let router = gate_router(probe.clone(), control.clone(), target, StopMode::Stop);

    let response = router.oneshot(get("/startupz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert!(body.starts_with("Critical Error"), "body was: {body}");
    assert_eq!(probe.call_count(), 0);
    assert_eq!(control.describe_count(), 0);
}

#[tokio::test]
async fn classifier_failure_reports_not_ready_and_dispatches_nothing() {
    let probe = Arc::new(StubProbe::down("down"));
    let control = Arc::new(FakeControlPlane::unreachable());
    let router = gate_router(probe, control.clone(), compute_target(), StopMode::Stop);

    let response = router.oneshot(get("/startupz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_string(response).await;
    assert!(body.contains("could not be determined"));
    assert!(!body.contains("permission denied"), "provider detail stays in logs");
    assert!(control.applied().is_empty());
}

#[tokio::test]
async fn stop_event_suspends_when_configured() {
    // Scenario E: one suspend call per stop signal, acknowledged.
    let probe = Arc::new(StubProbe::ready());
    let control = Arc::new(FakeControlPlane::with_state("RUNNING", None));
    let router = gate_router(probe, control.clone(), compute_target(), StopMode::Suspend);

    let response = router.oneshot(stop_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(control.applied(), vec![DesiredChange::Suspend]);
}

#[tokio::test]
async fn stop_event_redelivery_is_acknowledged() {
    let probe = Arc::new(StubProbe::ready());
    let control = Arc::new(FakeControlPlane::with_state("RUNNING", None));
    let router = gate_router(probe, control.clone(), compute_target(), StopMode::Stop);

    let first = router.clone().oneshot(stop_request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::NO_CONTENT);

    // At-least-once delivery: the duplicate must not surface an error.
    let second = router.oneshot(stop_request()).await.unwrap();
    assert_eq!(second.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        control.applied(),
        vec![DesiredChange::Stop, DesiredChange::Stop]
    );
}

#[tokio::test]
async fn malformed_stop_envelope_is_a_bad_request() {
    let probe = Arc::new(StubProbe::ready());
    let control = Arc::new(FakeControlPlane::with_state("RUNNING", None));
    let router = gate_router(probe, control.clone(), compute_target(), StopMode::Stop);

    let request = Request::builder()
        .method("POST")
        .uri("/events/stop")
        .header("content-type", "application/json")
        .body(Body::from("{\"nope\": true}"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(control.applied().is_empty());
}

#[tokio::test]
async fn health_endpoint_only_probes_connectivity() {
    let probe = Arc::new(StubProbe::ready());
    let control = Arc::new(FakeControlPlane::with_state("RUNNING", None));
    let router = gate_router(probe, control.clone(), compute_target(), StopMode::Stop);

    let response = router.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(control.describe_count(), 0);
}

#[tokio::test]
async fn health_endpoint_reports_unreachable_without_waking_anything() {
    let probe = Arc::new(StubProbe::down("gone"));
    let control = Arc::new(FakeControlPlane::with_state("TERMINATED", None));
    let router = gate_router(probe, control.clone(), compute_target(), StopMode::Stop);

    let response = router.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(control.describe_count(), 0);
    assert!(control.applied().is_empty());
}
