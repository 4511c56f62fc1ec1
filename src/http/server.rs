//! HTTP server setup and handlers.
//!
//! # Responsibilities
//! - Create the Axum router with the probe, health, and stop-event handlers
//! - Wire up middleware (tracing, request timeout)
//! - Map probe outcomes to the status contract the orchestrator retries on
//!
//! # Status contract
//! - 200: database reachable and live-query verified; route traffic
//! - 503: not ready yet; always retryable
//! - 500: configuration invalid; retrying cannot fix it

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::cloud::auth::{MetadataTokenSource, StaticTokenSource, TokenSource};
use crate::cloud::compute::ComputeClient;
use crate::cloud::sqladmin::SqlAdminClient;
use crate::cloud::{ControlPlane, ResourceKind, ResourceRef};
use crate::config::GateConfig;
use crate::db::{DatabaseProbe, MySqlProbe, ProbeStatus};
use crate::deactivate::{DeactivationHandler, PushEnvelope, StopMode};
use crate::error::GateError;
use crate::wake::{ProbeOutcome, WakeController};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<WakeController>,
    pub probe: Arc<dyn DatabaseProbe>,
    pub deactivation: Arc<DeactivationHandler>,
    /// `(max_wait, poll_interval)` for the blocking-wait variant; `None`
    /// reports after a single pass.
    pub wait: Option<(Duration, Duration)>,
}

/// HTTP server for the gate.
pub struct GateServer {
    router: Router,
}

impl GateServer {
    /// Assemble the server from pre-built components. Used directly by
    /// tests with capability doubles.
    pub fn new(state: AppState, request_timeout: Duration) -> Self {
        let router = Router::new()
            .route("/startupz", get(startup_probe))
            .route("/healthz", get(health_check))
            .route("/events/stop", post(stop_event))
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(TraceLayer::new_for_http());
        Self { router }
    }

    /// Build the production wiring from validated configuration.
    pub fn from_config(config: &GateConfig) -> Result<Self, GateError> {
        let target = ResourceRef {
            project: config.resource.project.clone(),
            location: config.resource.zone.clone(),
            resource: config.resource.instance.clone(),
            kind: config.resource.kind,
        };

        let tokens: Arc<dyn TokenSource> = if config.control_plane.access_token.is_empty() {
            Arc::new(MetadataTokenSource::new())
        } else {
            Arc::new(StaticTokenSource::new(&config.control_plane.access_token))
        };

        let endpoint = &config.control_plane.api_endpoint;
        let control: Arc<dyn ControlPlane> = match config.resource.kind {
            ResourceKind::ComputeInstance if endpoint.is_empty() => {
                Arc::new(ComputeClient::new(tokens))
            }
            ResourceKind::ComputeInstance => {
                Arc::new(ComputeClient::with_endpoint(endpoint, tokens))
            }
            ResourceKind::ManagedDatabase if endpoint.is_empty() => {
                Arc::new(SqlAdminClient::new(tokens))
            }
            ResourceKind::ManagedDatabase => {
                Arc::new(SqlAdminClient::with_endpoint(endpoint, tokens))
            }
        };

        let probe: Arc<dyn DatabaseProbe> = Arc::new(MySqlProbe::from_config(&config.database)?);

        let controller = Arc::new(WakeController::new(
            probe.clone(),
            control.clone(),
            target.clone(),
        ));

        let deactivation = Arc::new(DeactivationHandler::new(
            control,
            target,
            StopMode::from_config(&config.deactivation),
        ));

        let wait = (config.probe.max_wait_secs > 0).then(|| {
            (
                Duration::from_secs(config.probe.max_wait_secs),
                Duration::from_secs(config.probe.poll_interval_secs),
            )
        });

        let state = AppState {
            controller,
            probe,
            deactivation,
            wait,
        };
        Ok(Self::new(
            state,
            Duration::from_secs(config.listener.request_timeout_secs),
        ))
    }

    /// Expose the router for in-process testing.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Readiness probe: the wake controller's full decision path.
async fn startup_probe(State(state): State<AppState>) -> Response {
    let outcome = match state.wait {
        Some((max_wait, interval)) => state.controller.probe_until_ready(max_wait, interval).await,
        None => state.controller.run_probe().await,
    };
    probe_response(outcome)
}

fn probe_response(outcome: ProbeOutcome) -> Response {
    match outcome {
        ProbeOutcome::Ready => (StatusCode::OK, "OK").into_response(),
        ProbeOutcome::NotReady(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Service Unavailable: {reason}. Probe will retry."),
        )
            .into_response(),
        ProbeOutcome::Misconfigured(reason) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Critical Error: {reason}."),
        )
            .into_response(),
    }
}

/// Plain connectivity check for the warm path. Never touches the control
/// plane.
async fn health_check(State(state): State<AppState>) -> Response {
    match state.probe.probe().await {
        ProbeStatus::Ready => (StatusCode::OK, "OK").into_response(),
        ProbeStatus::Unreachable(detail) => {
            tracing::info!(detail = %detail, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service Unavailable: database unreachable",
            )
                .into_response()
        }
    }
}

/// Push-delivered stop signal.
async fn stop_event(State(state): State<AppState>, body: Bytes) -> Response {
    let envelope: PushEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed push envelope");
            return (StatusCode::BAD_REQUEST, "Bad Request: malformed push envelope")
                .into_response();
        }
    };

    match state.deactivation.on_stop_signal(&envelope).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(GateError::Configuration(reason)) => {
            tracing::error!(reason = %reason, "Stop signal rejected");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Critical Error: missing required configuration",
            )
                .into_response()
        }
        // Surfaced, not swallowed: a 5xx makes the delivery system redeliver.
        Err(e) => {
            tracing::error!(error = %e, "Stop signal failed");
            (StatusCode::BAD_GATEWAY, "Bad Gateway: control-plane call failed").into_response()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
