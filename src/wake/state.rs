//! Normalized lifecycle states and the provider-string classifier.

use crate::cloud::{ResourceKind, ResourceSnapshot};

/// Closed set of normalized lifecycle states.
///
/// `Transitioning` covers every provider "in between" sub-state
/// (starting, stopping, provisioning, repairing); the controller treats
/// them all as "wait, do not act".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Running,
    Stopped,
    Transitioning,
    Suspended,
    Unknown,
    Error,
}

impl std::fmt::Display for ResourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceState::Running => "running",
            ResourceState::Stopped => "stopped",
            ResourceState::Transitioning => "transitioning",
            ResourceState::Suspended => "suspended",
            ResourceState::Unknown => "unknown",
            ResourceState::Error => "error",
        };
        f.write_str(s)
    }
}

/// Persisted intent flag on a managed database resource. Compute instances
/// have no such flag and always classify as `Unspecified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationPolicy {
    Always,
    Never,
    Unspecified,
}

impl std::fmt::Display for ActivationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActivationPolicy::Always => "always",
            ActivationPolicy::Never => "never",
            ActivationPolicy::Unspecified => "unspecified",
        };
        f.write_str(s)
    }
}

/// Normalized result of one control-plane read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub state: ResourceState,
    pub policy: ActivationPolicy,
}

/// Map one raw snapshot to the closed state set.
///
/// Anything not recognized maps to `Unknown`, never to `Running` or
/// `Stopped`; the decision table must not act on a guess.
pub fn classify(kind: ResourceKind, snapshot: &ResourceSnapshot) -> Classification {
    let state = match kind {
        ResourceKind::ComputeInstance => classify_compute_state(&snapshot.raw_state),
        ResourceKind::ManagedDatabase => classify_database_state(&snapshot.raw_state),
    };

    let policy = match kind {
        ResourceKind::ComputeInstance => ActivationPolicy::Unspecified,
        ResourceKind::ManagedDatabase => classify_policy(snapshot.raw_policy.as_deref()),
    };

    if state == ResourceState::Unknown {
        tracing::warn!(
            raw_state = %snapshot.raw_state,
            kind = %kind,
            "Unrecognized provider state, treating as unknown"
        );
    }

    Classification { state, policy }
}

fn classify_compute_state(raw: &str) -> ResourceState {
    match raw {
        "RUNNING" => ResourceState::Running,
        "TERMINATED" => ResourceState::Stopped,
        "SUSPENDED" => ResourceState::Suspended,
        "PROVISIONING" | "STAGING" | "STOPPING" | "SUSPENDING" | "REPAIRING" => {
            ResourceState::Transitioning
        }
        _ => ResourceState::Unknown,
    }
}

fn classify_database_state(raw: &str) -> ResourceState {
    match raw {
        "RUNNABLE" => ResourceState::Running,
        "STOPPED" => ResourceState::Stopped,
        "SUSPENDED" => ResourceState::Suspended,
        "PENDING_CREATE" | "PENDING_DELETE" | "MAINTENANCE" => ResourceState::Transitioning,
        "FAILED" => ResourceState::Error,
        _ => ResourceState::Unknown,
    }
}

fn classify_policy(raw: Option<&str>) -> ActivationPolicy {
    match raw {
        Some("ALWAYS") => ActivationPolicy::Always,
        Some("NEVER") => ActivationPolicy::Never,
        _ => ActivationPolicy::Unspecified,
    }
}
