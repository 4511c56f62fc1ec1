//! Activation decision policy.
//!
//! Pure function, no I/O. This table is the consolidation point for the
//! drifted probe variants this service replaces: every state/policy
//! combination resolves to exactly one decision, and the "wait" rows make
//! repeated probes idempotent no-ops while a resource is transitioning.

use crate::cloud::ResourceKind;
use crate::wake::state::{ActivationPolicy, Classification, ResourceState};

/// What the dispatcher should do for one classified observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationDecision {
    /// The resource is already intended to run; the connectivity failure
    /// has another cause. Nothing to dispatch.
    NoAction,
    /// Issue an asynchronous instance start.
    TriggerStart,
    /// Patch the activation policy to ALWAYS. A database left runnable with
    /// policy NEVER by a prior scale-down only wakes through its policy;
    /// a bare "start" does not release it.
    TriggerActivationPolicyChange,
    /// A transition is in flight or the state is not actionable. Let the
    /// orchestrator retry.
    Wait,
}

/// Map one classification to a decision.
pub fn decide(kind: ResourceKind, classification: &Classification) -> ActivationDecision {
    match kind {
        ResourceKind::ComputeInstance => match classification.state {
            ResourceState::Stopped => ActivationDecision::TriggerStart,
            ResourceState::Running
            | ResourceState::Transitioning
            | ResourceState::Suspended
            | ResourceState::Unknown
            | ResourceState::Error => ActivationDecision::Wait,
        },
        ResourceKind::ManagedDatabase => match (classification.state, classification.policy) {
            (ResourceState::Stopped, _) => ActivationDecision::TriggerActivationPolicyChange,
            (ResourceState::Running, ActivationPolicy::Never) => {
                ActivationDecision::TriggerActivationPolicyChange
            }
            (ResourceState::Running, ActivationPolicy::Always | ActivationPolicy::Unspecified) => {
                ActivationDecision::NoAction
            }
            (
                ResourceState::Transitioning
                | ResourceState::Suspended
                | ResourceState::Unknown
                | ResourceState::Error,
                _,
            ) => ActivationDecision::Wait,
        },
    }
}
