//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files;
//! environment overrides are applied by the loader.

use serde::Deserialize;

use crate::cloud::ResourceKind;

/// Root configuration for the gate.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Downstream database credentials and probe timeout.
    pub database: DatabaseConfig,

    /// The control-plane resource that backs the database.
    pub resource: ResourceConfig,

    /// Scale-down behavior for the stop-signal endpoint.
    pub deactivation: DeactivationConfig,

    /// Optional blocking-wait settings for the readiness probe.
    pub probe: ProbeConfig,

    /// Control-plane client settings.
    pub control_plane: ControlPlaneConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Downstream database settings. All identity fields are required; there
/// are no guessed defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// MySQL hostname (e.g., "127.0.0.1" behind a Cloud SQL proxy).
    pub host: String,

    pub user: String,

    pub password: String,

    /// Database name.
    pub name: String,

    /// Connect timeout in seconds. Short on purpose: the orchestrator's
    /// own probe timeout must never be exceeded.
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            user: String::new(),
            password: String::new(),
            name: String::new(),
            connect_timeout_secs: 3,
        }
    }
}

/// Identity of the backing control-plane resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Cloud project id.
    pub project: String,

    /// Zone, required for compute instances only.
    pub zone: String,

    /// Instance id.
    pub instance: String,

    /// "compute" or "database".
    pub kind: ResourceKind,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            zone: String::new(),
            instance: String::new(),
            kind: ResourceKind::ManagedDatabase,
        }
    }
}

/// Scale-down settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DeactivationConfig {
    /// Suspend instead of a full stop. Suspend preserves in-memory and
    /// disk state for a faster resume; only compute instances support it.
    pub suspend: bool,
}

/// Readiness-probe tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Maximum blocking wait in seconds. Zero disables the blocking-wait
    /// variant; the probe then reports after a single pass and the
    /// orchestrator's retry schedule drives re-evaluation.
    pub max_wait_secs: u64,

    /// Re-check interval while blocking.
    pub poll_interval_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_wait_secs: 0,
            poll_interval_secs: 15,
        }
    }
}

/// Control-plane client settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ControlPlaneConfig {
    /// Override the provider API endpoint (tests, emulators). Empty means
    /// the real endpoints.
    pub api_endpoint: String,

    /// Static access token. Empty means fetch from the metadata server.
    pub access_token: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
