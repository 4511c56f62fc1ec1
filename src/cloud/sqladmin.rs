//! Cloud SQL Admin control-plane client.
//!
//! # Responsibilities
//! - Read instance state and activation policy with a single get
//! - Patch the activation policy, scoped by an update mask
//!
//! # Design Decisions
//! - There is no direct "start" verb for a managed instance; starting and
//!   stopping are expressed by patching `settings.activationPolicy` to
//!   ALWAYS or NEVER.
//! - The patch is scoped to exactly that field so a concurrent settings
//!   change (flags, tiers) is never clobbered by a full-object replace.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::cloud::auth::TokenSource;
use crate::cloud::{
    classify_http_failure, ControlPlane, ControlPlaneError, DesiredChange, OperationHandle,
    PolicyTarget, ResourceRef, ResourceSnapshot,
};

const DEFAULT_ENDPOINT: &str = "https://sqladmin.googleapis.com";

const ACTIVATION_POLICY_MASK: &str = "settings.activationPolicy";

#[derive(Debug, Deserialize)]
struct DatabaseInstanceResource {
    #[serde(default)]
    state: String,
    #[serde(default)]
    settings: Option<SettingsResource>,
}

#[derive(Debug, Deserialize)]
struct SettingsResource {
    #[serde(default, rename = "activationPolicy")]
    activation_policy: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationResource {
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
}

/// REST client for the Cloud SQL Admin instances API.
pub struct SqlAdminClient {
    http: reqwest::Client,
    endpoint: String,
    tokens: Arc<dyn TokenSource>,
}

impl SqlAdminClient {
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
            "{}/v1/projects/{}/instances/{}",
            self.endpoint, target.project, target.resource
        )
    }

    async fn patch_activation_policy(
        &self,
        target: &ResourceRef,
        policy: PolicyTarget,
    ) -> Result<OperationHandle, ControlPlaneError> {
        let token = self.tokens.access_token().await?;

        // Partial update: only settings.activationPolicy may change.
        let body = json!({
            "name": target.resource,
            "settings": { "activationPolicy": policy.as_provider_str() }
        });

        let response = self
            .http
            .patch(self.instance_url(target))
            .query(&[("updateMask", ACTIVATION_POLICY_MASK)])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ControlPlaneError::Request(format!("instance patch failed: {e}")))?;

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
impl ControlPlane for SqlAdminClient {
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

        let instance: DatabaseInstanceResource = response
            .json()
            .await
            .map_err(|e| ControlPlaneError::Request(format!("malformed instance response: {e}")))?;

        let policy = instance.settings.and_then(|s| s.activation_policy);

        tracing::debug!(
            instance = %target.resource,
            state = %instance.state,
            policy = policy.as_deref().unwrap_or("-"),
            "Cloud SQL instance described"
        );

        Ok(ResourceSnapshot {
            raw_state: instance.state,
            raw_policy: policy,
        })
    }

    async fn apply(
        &self,
        target: &ResourceRef,
        change: DesiredChange,
    ) -> Result<OperationHandle, ControlPlaneError> {
        match change {
            // Managed instances are started and stopped through the policy.
            DesiredChange::Start => self.patch_activation_policy(target, PolicyTarget::Always).await,
            DesiredChange::Stop => self.patch_activation_policy(target, PolicyTarget::Never).await,
            DesiredChange::SetActivationPolicy(policy) => {
                self.patch_activation_policy(target, policy).await
            }
            DesiredChange::Suspend => Err(ControlPlaneError::Unsupported(
                "managed database instances cannot be suspended".into(),
            )),
        }
    }
}
