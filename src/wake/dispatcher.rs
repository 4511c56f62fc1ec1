//! Activation dispatcher.
//!
//! # Responsibilities
//! - Issue exactly one asynchronous control-plane mutation per decision
//! - Fold "already in progress / already in target state" to success
//!
//! Concurrent probe invocations may race to wake the same resource; the
//! provider's own concurrency control resolves the race and the fold keeps
//! the losing probe from surfacing a spurious error.

use std::sync::Arc;

use crate::cloud::{
    ControlPlane, ControlPlaneError, DesiredChange, PolicyTarget, ResourceRef,
};
use crate::wake::decision::ActivationDecision;

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The provider accepted the asynchronous operation.
    Accepted { operation_id: String },
    /// The resource was already in the desired state, or an equivalent
    /// operation was already in flight.
    AlreadySatisfied,
}

pub struct Dispatcher {
    control: Arc<dyn ControlPlane>,
}

impl Dispatcher {
    pub fn new(control: Arc<dyn ControlPlane>) -> Self {
        Self { control }
    }

    /// Issue the mutation for a trigger decision. `NoAction` and `Wait`
    /// dispatch nothing.
    pub async fn dispatch(
        &self,
        target: &ResourceRef,
        decision: ActivationDecision,
    ) -> Result<DispatchOutcome, ControlPlaneError> {
        let change = match decision {
            ActivationDecision::TriggerStart => DesiredChange::Start,
            ActivationDecision::TriggerActivationPolicyChange => {
                DesiredChange::SetActivationPolicy(PolicyTarget::Always)
            }
            ActivationDecision::NoAction | ActivationDecision::Wait => {
                tracing::debug!(resource = %target.resource, ?decision, "Nothing to dispatch");
                return Ok(DispatchOutcome::AlreadySatisfied);
            }
        };

        match self.control.apply(target, change).await {
            Ok(operation) => {
                tracing::info!(
                    resource = %target.resource,
                    operation = %operation.id,
                    done = operation.done,
                    ?change,
                    "Activation dispatched"
                );
                Ok(DispatchOutcome::Accepted {
                    operation_id: operation.id,
                })
            }
            Err(ControlPlaneError::AlreadySatisfied(detail)) => {
                tracing::info!(
                    resource = %target.resource,
                    detail = %detail,
                    "Activation already satisfied"
                );
                Ok(DispatchOutcome::AlreadySatisfied)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{OperationHandle, ResourceKind, ResourceSnapshot};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Control-plane double: accepts the first apply, reports every later
    /// one as already satisfied.
    struct OnceControlPlane {
        applies: AtomicU32,
        changes: Mutex<Vec<DesiredChange>>,
    }

    impl OnceControlPlane {
        fn new() -> Self {
            Self {
                applies: AtomicU32::new(0),
                changes: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ControlPlane for OnceControlPlane {
        async fn describe(
            &self,
            _target: &ResourceRef,
        ) -> Result<ResourceSnapshot, ControlPlaneError> {
            Ok(ResourceSnapshot::default())
        }

        async fn apply(
            &self,
            _target: &ResourceRef,
            change: DesiredChange,
        ) -> Result<OperationHandle, ControlPlaneError> {
            self.changes.lock().unwrap().push(change);
            if self.applies.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(OperationHandle {
                    id: "op-1".into(),
                    done: false,
                })
            } else {
                Err(ControlPlaneError::AlreadySatisfied(
                    "operation in progress".into(),
                ))
            }
        }
    }

    fn target() -> ResourceRef {
        ResourceRef {
            project: "proj".into(),
            location: "us-central1-a".into(),
            resource: "db-vm".into(),
            kind: ResourceKind::ComputeInstance,
        }
    }

    #[tokio::test]
    async fn second_dispatch_folds_to_already_satisfied() {
        let control = Arc::new(OnceControlPlane::new());
        let dispatcher = Dispatcher::new(control.clone());

        let first = dispatcher
            .dispatch(&target(), ActivationDecision::TriggerStart)
            .await
            .unwrap();
        assert_eq!(
            first,
            DispatchOutcome::Accepted {
                operation_id: "op-1".into()
            }
        );

        let second = dispatcher
            .dispatch(&target(), ActivationDecision::TriggerStart)
            .await
            .unwrap();
        assert_eq!(second, DispatchOutcome::AlreadySatisfied);

        // Two calls, but only one distinct side-effecting operation.
        let changes = control.changes.lock().unwrap();
        assert_eq!(changes.as_slice(), &[DesiredChange::Start, DesiredChange::Start]);
    }

    #[tokio::test]
    async fn policy_change_targets_always() {
        let control = Arc::new(OnceControlPlane::new());
        let dispatcher = Dispatcher::new(control.clone());

        dispatcher
            .dispatch(&target(), ActivationDecision::TriggerActivationPolicyChange)
            .await
            .unwrap();

        let changes = control.changes.lock().unwrap();
        assert_eq!(
            changes.as_slice(),
            &[DesiredChange::SetActivationPolicy(PolicyTarget::Always)]
        );
    }

    #[tokio::test]
    async fn wait_and_noop_dispatch_nothing() {
        let control = Arc::new(OnceControlPlane::new());
        let dispatcher = Dispatcher::new(control.clone());

        for decision in [ActivationDecision::Wait, ActivationDecision::NoAction] {
            let outcome = dispatcher.dispatch(&target(), decision).await.unwrap();
            assert_eq!(outcome, DispatchOutcome::AlreadySatisfied);
        }
        assert!(control.changes.lock().unwrap().is_empty());
    }
}
