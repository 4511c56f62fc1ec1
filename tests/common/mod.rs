//! Shared doubles and router assembly for integration testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;

use wakegate::cloud::{
    ControlPlane, ControlPlaneError, DesiredChange, OperationHandle, ResourceKind, ResourceRef,
    ResourceSnapshot,
};
use wakegate::db::{DatabaseProbe, ProbeStatus};
use wakegate::deactivate::{DeactivationHandler, StopMode};
use wakegate::http::{AppState, GateServer};
use wakegate::WakeController;

/// Connectivity-probe double with a fixed answer and a call counter.
pub struct StubProbe {
    status: ProbeStatus,
    pub calls: AtomicU32,
}

impl StubProbe {
    pub fn ready() -> Self {
        Self {
            status: ProbeStatus::Ready,
            calls: AtomicU32::new(0),
        }
    }

    pub fn down(detail: &str) -> Self {
        Self {
            status: ProbeStatus::Unreachable(detail.into()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseProbe for StubProbe {
    async fn probe(&self) -> ProbeStatus {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.status.clone()
    }
}

/// Control-plane double: scripted snapshot, recorded mutations. The first
/// apply is accepted; later ones answer "already satisfied", matching how
/// the real providers react to a duplicate request.
pub struct FakeControlPlane {
    snapshot: Option<ResourceSnapshot>,
    pub describes: AtomicU32,
    applies: AtomicU32,
    pub changes: Mutex<Vec<DesiredChange>>,
}

impl FakeControlPlane {
    pub fn with_state(state: &str, policy: Option<&str>) -> Self {
        Self {
            snapshot: Some(ResourceSnapshot {
                raw_state: state.into(),
                raw_policy: policy.map(str::to_string),
            }),
            describes: AtomicU32::new(0),
            applies: AtomicU32::new(0),
            changes: Mutex::new(Vec::new()),
        }
    }

    /// Every describe fails, as with revoked credentials.
    pub fn unreachable() -> Self {
        Self {
            snapshot: None,
            describes: AtomicU32::new(0),
            applies: AtomicU32::new(0),
            changes: Mutex::new(Vec::new()),
        }
    }

    pub fn applied(&self) -> Vec<DesiredChange> {
        self.changes.lock().unwrap().clone()
    }

    pub fn describe_count(&self) -> u32 {
        self.describes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn describe(&self, _target: &ResourceRef) -> Result<ResourceSnapshot, ControlPlaneError> {
        self.describes.fetch_add(1, Ordering::SeqCst);
        match &self.snapshot {
            Some(snapshot) => Ok(snapshot.clone()),
            None => Err(ControlPlaneError::Denied("permission denied".into())),
        }
    }

    async fn apply(
        &self,
        _target: &ResourceRef,
        change: DesiredChange,
    ) -> Result<OperationHandle, ControlPlaneError> {
        self.changes.lock().unwrap().push(change);
        if self.applies.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(OperationHandle {
                id: "op-test".into(),
                done: false,
            })
        } else {
            Err(ControlPlaneError::AlreadySatisfied(
                "operation in progress".into(),
            ))
        }
    }
}

pub fn compute_target() -> ResourceRef {
    ResourceRef {
        project: "test-project".into(),
        location: "us-central1-a".into(),
        resource: "wp-db-vm".into(),
        kind: ResourceKind::ComputeInstance,
    }
}

pub fn database_target() -> ResourceRef {
    ResourceRef {
        project: "test-project".into(),
        location: String::new(),
        resource: "wp-sql".into(),
        kind: ResourceKind::ManagedDatabase,
    }
}

/// Assemble the full router around the given doubles.
pub fn gate_router(
    probe: Arc<StubProbe>,
    control: Arc<FakeControlPlane>,
    target: ResourceRef,
    mode: StopMode,
) -> Router {
    let controller = Arc::new(WakeController::new(
        probe.clone(),
        control.clone(),
        target.clone(),
    ));
    let deactivation = Arc::new(DeactivationHandler::new(control, target, mode));
    let state = AppState {
        controller,
        probe,
        deactivation,
        wait: None,
    };
    GateServer::new(state, Duration::from_secs(5)).into_router()
}
