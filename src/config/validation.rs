//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check required identity fields are present; a missing value is an
//!   error, never a guessed default
//! - Reject combinations the providers cannot express
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::cloud::ResourceKind;
use crate::config::schema::GateConfig;

/// One semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut require = |field: &str, value: &str| {
        if value.is_empty() {
            errors.push(ValidationError {
                field: field.to_string(),
                message: "required value is missing".to_string(),
            });
        }
    };

    require("resource.project", &config.resource.project);
    require("resource.instance", &config.resource.instance);
    require("database.host", &config.database.host);
    require("database.user", &config.database.user);
    require("database.password", &config.database.password);
    require("database.name", &config.database.name);

    if config.resource.kind == ResourceKind::ComputeInstance && config.resource.zone.is_empty() {
        errors.push(ValidationError {
            field: "resource.zone".into(),
            message: "required for compute instances".into(),
        });
    }

    if config.resource.kind == ResourceKind::ManagedDatabase && config.deactivation.suspend {
        errors.push(ValidationError {
            field: "deactivation.suspend".into(),
            message: "managed database instances cannot be suspended; use stop".into(),
        });
    }

    if config.database.connect_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "database.connect_timeout_secs".into(),
            message: "must be greater than zero".into(),
        });
    }

    if config.probe.max_wait_secs > 0 {
        if config.probe.poll_interval_secs == 0 {
            errors.push(ValidationError {
                field: "probe.poll_interval_secs".into(),
                message: "must be greater than zero when a wait budget is set".into(),
            });
        }
        // The blocking wait runs inside one request; it must fit under the
        // request timeout or the orchestrator only ever sees timeouts.
        if config.probe.max_wait_secs >= config.listener.request_timeout_secs {
            errors.push(ValidationError {
                field: "probe.max_wait_secs".into(),
                message: "must be below listener.request_timeout_secs".into(),
            });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address".into(),
            message: format!("'{}' is not a valid socket address", config.listener.bind_address),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
