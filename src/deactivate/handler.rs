//! Deactivation handler.
//!
//! # Responsibilities
//! - Validate the configured target before any control-plane call
//! - Issue exactly one stop or suspend per signal, per the configured mode
//! - Log the returned operation id and return immediately; never poll
//!
//! The stop/suspend call is asynchronous on the provider side and keeps
//! running after this handler has acknowledged.

use std::sync::Arc;

use crate::cloud::{
    ControlPlane, ControlPlaneError, DesiredChange, PolicyTarget, ResourceKind, ResourceRef,
};
use crate::config::DeactivationConfig;
use crate::deactivate::event::PushEnvelope;
use crate::error::GateError;

/// How a stop signal is carried out. The two modes are mutually exclusive,
/// selected once at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    /// Full shutdown.
    Stop,
    /// Preserve in-memory and disk state for a faster resume. Compute
    /// instances only.
    Suspend,
}

impl StopMode {
    pub fn from_config(config: &DeactivationConfig) -> Self {
        if config.suspend {
            StopMode::Suspend
        } else {
            StopMode::Stop
        }
    }
}

/// Successful acknowledgment of a stop signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopAck {
    /// The provider accepted a new asynchronous operation.
    Dispatched { operation_id: String },
    /// The resource was already stopped or an equivalent operation was in
    /// flight, the expected case on redelivery.
    AlreadySatisfied,
}

pub struct DeactivationHandler {
    control: Arc<dyn ControlPlane>,
    target: ResourceRef,
    mode: StopMode,
}

impl DeactivationHandler {
    pub fn new(control: Arc<dyn ControlPlane>, target: ResourceRef, mode: StopMode) -> Self {
        Self {
            control,
            target,
            mode,
        }
    }

    /// Handle one push-delivered stop signal.
    ///
    /// Missing configuration is a fatal rejection: no partial or
    /// best-effort stop is ever attempted. Control-plane failures are
    /// surfaced so the delivery system can redeliver.
    pub async fn on_stop_signal(&self, envelope: &PushEnvelope) -> Result<StopAck, GateError> {
        self.target
            .validate()
            .map_err(GateError::Configuration)?;

        tracing::info!(
            message_id = %envelope.message.message_id,
            subscription = %envelope.subscription,
            payload = envelope.message.decoded_data().as_deref().unwrap_or("-"),
            resource = %self.target.resource,
            mode = ?self.mode,
            "Stop signal received"
        );

        let change = match (self.target.kind, self.mode) {
            (ResourceKind::ComputeInstance, StopMode::Stop) => DesiredChange::Stop,
            (ResourceKind::ComputeInstance, StopMode::Suspend) => DesiredChange::Suspend,
            // A managed database stops by parking its activation policy.
            (ResourceKind::ManagedDatabase, StopMode::Stop) => {
                DesiredChange::SetActivationPolicy(PolicyTarget::Never)
            }
            (ResourceKind::ManagedDatabase, StopMode::Suspend) => {
                // Config validation rejects this combination up front.
                return Err(GateError::Configuration(
                    "managed database instances cannot be suspended".into(),
                ));
            }
        };

        match self.control.apply(&self.target, change).await {
            Ok(operation) => {
                tracing::info!(
                    resource = %self.target.resource,
                    operation = %operation.id,
                    done = operation.done,
                    ?change,
                    "Deactivation dispatched"
                );
                Ok(StopAck::Dispatched {
                    operation_id: operation.id,
                })
            }
            Err(ControlPlaneError::AlreadySatisfied(detail)) => {
                tracing::info!(
                    resource = %self.target.resource,
                    detail = %detail,
                    "Deactivation already satisfied"
                );
                Ok(StopAck::AlreadySatisfied)
            }
            Err(e) => {
                tracing::error!(
                    resource = %self.target.resource,
                    error = %e,
                    "Deactivation dispatch failed"
                );
                Err(GateError::ControlPlane {
                    detail: e.to_string(),
                })
            }
        }
    }
}
