//! Access tokens for control-plane calls.
//!
//! # Responsibilities
//! - Fetch service-account tokens from the GCE/Cloud Run metadata server
//! - Cache a token until shortly before it expires
//! - Allow a statically configured token for local runs and tests

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::cloud::ControlPlaneError;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh this long before the reported expiry.
const EXPIRY_SLACK: Duration = Duration::from_secs(60);

/// Source of bearer tokens for provider API calls.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, ControlPlaneError>;
}

/// Fixed token supplied through configuration.
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String, ControlPlaneError> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Token source backed by the instance metadata server.
pub struct MetadataTokenSource {
    http: reqwest::Client,
    url: String,
    cache: Mutex<Option<CachedToken>>,
}

impl MetadataTokenSource {
    pub fn new() -> Self {
        Self::with_url(METADATA_TOKEN_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            cache: Mutex::new(None),
        }
    }
}

impl Default for MetadataTokenSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenSource for MetadataTokenSource {
    async fn access_token(&self) -> Result<String, ControlPlaneError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.token.clone());
            }
        }

        let response = self
            .http
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| ControlPlaneError::Denied(format!("metadata server unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(ControlPlaneError::Denied(format!(
                "metadata server returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ControlPlaneError::Denied(format!("malformed token response: {e}")))?;

        let ttl = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_SLACK);
        *cache = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at: Instant::now() + ttl,
        });

        tracing::debug!(ttl_secs = ttl.as_secs(), "Access token refreshed");
        Ok(token.access_token)
    }
}
