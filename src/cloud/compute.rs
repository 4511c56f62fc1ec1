//! Compute Engine control-plane client.
//!
//! # Responsibilities
//! - Read instance status with a single get
//! - Issue asynchronous start/stop/suspend calls
//!
//! The instance start/stop/suspend endpoints return a zonal operation
//! resource immediately; the instance keeps transitioning after this client
//! has returned.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::cloud::auth::TokenSource;
use crate::cloud::{
    classify_http_failure, ControlPlane, ControlPlaneError, DesiredChange, OperationHandle,
    ResourceRef, ResourceSnapshot,
};

const DEFAULT_ENDPOINT: &str = "https://compute.googleapis.com";

#[derive(Debug, Deserialize)]
struct InstanceResource {
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct OperationResource {
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
}

/// REST client for the Compute Engine instances API.
pub struct ComputeClient {
    http: reqwest::Client,
    endpoint: String,
    tokens: Arc<dyn TokenSource>,
}

impl ComputeClient {
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT, tokens)
    }

    /// Point the client at a non-default API endpoint (tests, emulators).
    pub fn with_endpoint(endpoint: impl Into<String>, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            tokens,
        }
    }

    fn instance_url(&self, target: &ResourceRef) -> String {
        format!(
            "{}/compute/v1/projects/{}/zones/{}/instances/{}",
            self.endpoint, target.project, target.location, target.resource
        )
    }

    async fn post_lifecycle(
        &self,
        target: &ResourceRef,
        verb: &str,
    ) -> Result<OperationHandle, ControlPlaneError> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/{}", self.instance_url(target), verb);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ControlPlaneError::Request(format!("{verb} call failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_failure(status, &body));
        }

        let operation: OperationResource = response
            .json()
            .await
            .map_err(|e| ControlPlaneError::Request(format!("malformed operation response: {e}")))?;

        Ok(OperationHandle {
            id: operation.name,
            done: operation.status == "DONE",
        })
    }
}

#[async_trait]
impl ControlPlane for ComputeClient {
    async fn describe(&self, target: &ResourceRef) -> Result<ResourceSnapshot, ControlPlaneError> {
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .get(self.instance_url(target))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ControlPlaneError::Request(format!("instance get failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_failure(status, &body));
        }

        let instance: InstanceResource = response
            .json()
            .await
            .map_err(|e| ControlPlaneError::Request(format!("malformed instance response: {e}")))?;

        tracing::debug!(
            instance = %target.resource,
            status = %instance.status,
            "Compute instance described"
        );

        Ok(ResourceSnapshot {
            raw_state: instance.status,
            raw_policy: None,
        })
    }

    async fn apply(
        &self,
        target: &ResourceRef,
        change: DesiredChange,
    ) -> Result<OperationHandle, ControlPlaneError> {
        let verb = match change {
            DesiredChange::Start => "start",
            DesiredChange::Stop => "stop",
            DesiredChange::Suspend => "suspend",
            DesiredChange::SetActivationPolicy(_) => {
                return Err(ControlPlaneError::Unsupported(
                    "compute instances have no activation policy".into(),
                ))
            }
        };
        self.post_lifecycle(target, verb).await
    }
}
