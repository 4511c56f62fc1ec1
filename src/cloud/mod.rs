//! Control-plane capability.
//!
//! # Data Flow
//! ```text
//! wake controller / deactivation handler
//!     → ControlPlane::describe (one get per probe invocation)
//!     → ControlPlane::apply    (one asynchronous mutation per decision)
//!
//! Implementations:
//!     compute.rs   → Compute Engine REST API (VM running MySQL)
//!     sqladmin.rs  → Cloud SQL Admin REST API (managed database)
//!     auth.rs      → access tokens from the metadata server
//! ```
//!
//! # Design Decisions
//! - The trait speaks normalized snapshots and desired changes; provider
//!   enum strings are mapped to the closed state set in `wake::state`.
//! - Mutations are fire-and-forget: callers log the operation handle and
//!   never poll for completion.
//! - "Already in progress" / "already in target state" provider responses
//!   are a distinct error variant so dispatchers can fold them to success.

pub mod auth;
pub mod compute;
pub mod sqladmin;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// What kind of resource backs the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ResourceKind {
    /// A Compute Engine VM hosting MySQL. Started and stopped directly.
    #[serde(rename = "compute")]
    ComputeInstance,
    /// A managed Cloud SQL instance. Driven through its activation policy.
    #[serde(rename = "database")]
    ManagedDatabase,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::ComputeInstance => write!(f, "compute"),
            ResourceKind::ManagedDatabase => write!(f, "database"),
        }
    }
}

/// Identifies one control-plane resource. Immutable, built from config at
/// process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    /// Provider-scoped project id.
    pub project: String,
    /// Zone for compute instances. Cloud SQL instances are addressed
    /// project-wide and leave this empty.
    pub location: String,
    /// Instance id.
    pub resource: String,
    pub kind: ResourceKind,
}

impl ResourceRef {
    /// Check that every field required for this kind is present.
    ///
    /// An incomplete ref must never reach a control-plane call; callers
    /// turn the error into a `Misconfigured` outcome.
    pub fn validate(&self) -> Result<(), String> {
        let mut missing = Vec::new();
        if self.project.is_empty() {
            missing.push("project");
        }
        if self.resource.is_empty() {
            missing.push("resource id");
        }
        if self.kind == ResourceKind::ComputeInstance && self.location.is_empty() {
            missing.push("zone");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("resource reference incomplete: missing {}", missing.join(", ")))
        }
    }
}

/// Raw lifecycle fields read from one control-plane get.
#[derive(Debug, Clone, Default)]
pub struct ResourceSnapshot {
    /// Provider state string, e.g. `TERMINATED` or `RUNNABLE`.
    pub raw_state: String,
    /// Provider activation-policy string, database kind only.
    pub raw_policy: Option<String>,
}

/// Target value for an activation-policy change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyTarget {
    Always,
    Never,
}

impl PolicyTarget {
    pub fn as_provider_str(&self) -> &'static str {
        match self {
            PolicyTarget::Always => "ALWAYS",
            PolicyTarget::Never => "NEVER",
        }
    }
}

/// One asynchronous lifecycle mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredChange {
    Start,
    Stop,
    Suspend,
    SetActivationPolicy(PolicyTarget),
}

/// Handle for an accepted asynchronous operation.
#[derive(Debug, Clone)]
pub struct OperationHandle {
    pub id: String,
    pub done: bool,
}

/// Failures of control-plane calls.
#[derive(Debug, Error)]
pub enum ControlPlaneError {
    /// Transport-level or unclassified request failure.
    #[error("control plane request failed: {0}")]
    Request(String),

    /// The provider rejected the credentials or the caller's permissions.
    #[error("control plane denied the call: {0}")]
    Denied(String),

    /// The referenced resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The resource is already in the requested state, or an equivalent
    /// operation is already in flight. Callers fold this to success.
    #[error("already satisfied: {0}")]
    AlreadySatisfied(String),

    /// The requested change is not expressible for this resource kind.
    #[error("unsupported change for this resource kind: {0}")]
    Unsupported(String),
}

/// Management-API capability consumed by the wake controller and the
/// deactivation handler.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Read the current lifecycle fields of the resource. Called at most
    /// once per probe invocation.
    async fn describe(&self, target: &ResourceRef) -> Result<ResourceSnapshot, ControlPlaneError>;

    /// Issue one asynchronous lifecycle mutation. The returned handle is
    /// logged, never polled.
    async fn apply(
        &self,
        target: &ResourceRef,
        change: DesiredChange,
    ) -> Result<OperationHandle, ControlPlaneError>;
}

/// Map an HTTP failure status from a provider API to the error taxonomy.
pub(crate) fn classify_http_failure(status: reqwest::StatusCode, body: &str) -> ControlPlaneError {
    let detail = format!("{}: {}", status, truncate(body, 512));
    match status.as_u16() {
        401 | 403 => ControlPlaneError::Denied(detail),
        404 => ControlPlaneError::NotFound(detail),
        409 => ControlPlaneError::AlreadySatisfied(detail),
        // The SQL Admin API reports an in-flight operation as a 400 with
        // reason "operationInProgress" rather than a 409. Only that exact
        // token folds; other 400 bodies are genuine request errors.
        400 if body.contains("operationInProgress") => {
            ControlPlaneError::AlreadySatisfied(detail)
        }
        _ => ControlPlaneError::Request(detail),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
