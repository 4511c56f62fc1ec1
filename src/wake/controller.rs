//! Probe orchestration.
//!
//! # Responsibilities
//! - Compose prober → classifier → decision → dispatcher into one outcome
//! - Enforce the per-invocation invariants: validate the resource reference
//!   before any network call, at most one control-plane get, no state
//!   carried across invocations
//! - Offer the explicit blocking-wait variant for callers whose timeout
//!   budget exceeds typical start latency

use std::sync::Arc;
use std::time::Duration;

use crate::cloud::{ControlPlane, ResourceRef};
use crate::db::{DatabaseProbe, ProbeStatus};
use crate::wake::decision::{decide, ActivationDecision};
use crate::wake::dispatcher::{DispatchOutcome, Dispatcher};
use crate::wake::state::classify;

/// Composed result of one probe invocation. Consumed by the HTTP reporter,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Database reachable and the liveness query verified.
    Ready,
    /// Not ready yet; the orchestrator should retry. Carries a short,
    /// non-sensitive diagnostic (resource id, observed state).
    NotReady(String),
    /// Required inputs are missing. Retrying cannot change this.
    Misconfigured(String),
}

pub struct WakeController {
    probe: Arc<dyn DatabaseProbe>,
    control: Arc<dyn ControlPlane>,
    target: ResourceRef,
}

impl WakeController {
    pub fn new(
        probe: Arc<dyn DatabaseProbe>,
        control: Arc<dyn ControlPlane>,
        target: ResourceRef,
    ) -> Self {
        Self {
            probe,
            control,
            target,
        }
    }

    /// One full probe invocation.
    pub async fn run_probe(&self) -> ProbeOutcome {
        // An incomplete reference is a configuration fault, reported before
        // any network traffic.
        if let Err(detail) = self.target.validate() {
            tracing::error!(detail = %detail, "Probe misconfigured");
            return ProbeOutcome::Misconfigured(detail);
        }

        match self.probe.probe().await {
            ProbeStatus::Ready => {
                tracing::info!("Database reachable, probe succeeded");
                return ProbeOutcome::Ready;
            }
            ProbeStatus::Unreachable(detail) => {
                tracing::info!(
                    resource = %self.target.resource,
                    detail = %detail,
                    "Database unreachable, inspecting resource state"
                );
            }
        }

        let snapshot = match self.control.describe(&self.target).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // Classifier error: the state could not be determined, which
                // is different from an unknown-by-policy state. Nothing is
                // dispatched on this path.
                tracing::error!(
                    resource = %self.target.resource,
                    error = %e,
                    "Control-plane read failed"
                );
                return ProbeOutcome::NotReady(format!(
                    "state of '{}' could not be determined",
                    self.target.resource
                ));
            }
        };

        let classification = classify(self.target.kind, &snapshot);
        let decision = decide(self.target.kind, &classification);

        tracing::info!(
            resource = %self.target.resource,
            state = %classification.state,
            policy = %classification.policy,
            ?decision,
            "Resource classified"
        );

        let diagnostic = format!(
            "'{}' is {} (policy {})",
            self.target.resource, classification.state, classification.policy
        );

        match decision {
            ActivationDecision::NoAction => ProbeOutcome::NotReady(format!(
                "{diagnostic}; connectivity failure has another cause"
            )),
            ActivationDecision::Wait => {
                ProbeOutcome::NotReady(format!("{diagnostic}; waiting for it to settle"))
            }
            ActivationDecision::TriggerStart | ActivationDecision::TriggerActivationPolicyChange => {
                let dispatcher = Dispatcher::new(self.control.clone());
                match dispatcher.dispatch(&self.target, decision).await {
                    Ok(DispatchOutcome::Accepted { operation_id }) => {
                        tracing::info!(
                            resource = %self.target.resource,
                            operation = %operation_id,
                            "Activation triggered"
                        );
                        ProbeOutcome::NotReady(format!("{diagnostic}; activation triggered"))
                    }
                    Ok(DispatchOutcome::AlreadySatisfied) => {
                        ProbeOutcome::NotReady(format!("{diagnostic}; activation already under way"))
                    }
                    Err(e) => {
                        // Full detail stays in the log stream; the response
                        // body carries only the short diagnostic.
                        tracing::error!(
                            resource = %self.target.resource,
                            error = %e,
                            "Activation dispatch failed"
                        );
                        ProbeOutcome::NotReady(format!("{diagnostic}; activation not confirmed"))
                    }
                }
            }
        }
    }

    /// Blocking-wait variant: repeat full probe invocations until ready,
    /// misconfigured, or the wait budget runs out; returns the last
    /// outcome. Each iteration is an ordinary invocation, so the
    /// one-get-per-invocation invariant holds and re-dispatch folds to
    /// "already satisfied".
    ///
    /// This is an explicit, separately configured operation, never the
    /// default path. Callers must know their own timeout budget exceeds
    /// `max_wait`.
    pub async fn probe_until_ready(&self, max_wait: Duration, interval: Duration) -> ProbeOutcome {
        let started = tokio::time::Instant::now();
        loop {
            let outcome = self.run_probe().await;
            match outcome {
                ProbeOutcome::Ready | ProbeOutcome::Misconfigured(_) => return outcome,
                ProbeOutcome::NotReady(_) => {
                    let elapsed = started.elapsed();
                    if elapsed + interval >= max_wait {
                        tracing::info!(
                            waited_secs = elapsed.as_secs(),
                            "Wait budget exhausted, reporting not ready"
                        );
                        return outcome;
                    }
                    tracing::info!(
                        waited_secs = elapsed.as_secs(),
                        budget_secs = max_wait.as_secs(),
                        "Not ready yet, re-probing after interval"
                    );
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }
}
