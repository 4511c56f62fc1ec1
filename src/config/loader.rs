//! Configuration loading.
//!
//! An optional TOML file supplies the base configuration; environment
//! variables overlay it. The environment names match the PHP-era
//! deployment (PROJECT_ID, WORDPRESS_DB_*) so existing service manifests
//! keep working, with WAKEGATE_* names for the gate's own tunables.

use std::fs;
use std::path::Path;

use crate::cloud::ResourceKind;
use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: TOML file (if given) overlaid by the environment,
/// then validated.
pub fn load_config(path: Option<&Path>) -> Result<GateConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => GateConfig::default(),
    };

    apply_overrides(&mut config, &|name| std::env::var(name).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay configuration with named values from `lookup`. Split out from
/// the process environment so tests do not mutate global state.
pub fn apply_overrides(config: &mut GateConfig, lookup: &dyn Fn(&str) -> Option<String>) {
    let mut set = |name: &str, slot: &mut String| {
        if let Some(value) = lookup(name) {
            *slot = value;
        }
    };

    set("PROJECT_ID", &mut config.resource.project);
    set("GCE_ZONE", &mut config.resource.zone);
    set("WORDPRESS_DB_INSTANCE_ID", &mut config.resource.instance);
    set("WORDPRESS_DB_HOST", &mut config.database.host);
    set("WORDPRESS_DB_USER", &mut config.database.user);
    set("WORDPRESS_DB_PASSWORD", &mut config.database.password);
    set("WORDPRESS_DB_NAME", &mut config.database.name);
    set("WAKEGATE_BIND_ADDRESS", &mut config.listener.bind_address);
    set("WAKEGATE_API_ENDPOINT", &mut config.control_plane.api_endpoint);
    set("WAKEGATE_ACCESS_TOKEN", &mut config.control_plane.access_token);
    set("WAKEGATE_LOG_LEVEL", &mut config.observability.log_level);

    if let Some(value) = lookup("WAKEGATE_RESOURCE_KIND") {
        match value.as_str() {
            "compute" => config.resource.kind = ResourceKind::ComputeInstance,
            "database" => config.resource.kind = ResourceKind::ManagedDatabase,
            other => {
                tracing::warn!(value = %other, "Unrecognized WAKEGATE_RESOURCE_KIND, keeping configured kind");
            }
        }
    }

    let mut set_u64 = |name: &str, slot: &mut u64| {
        if let Some(value) = lookup(name) {
            match value.parse() {
                Ok(parsed) => *slot = parsed,
                Err(_) => {
                    tracing::warn!(name = %name, value = %value, "Ignoring non-numeric override");
                }
            }
        }
    };

    set_u64(
        "WAKEGATE_DB_CONNECT_TIMEOUT_SECS",
        &mut config.database.connect_timeout_secs,
    );
    set_u64("WAKEGATE_MAX_WAIT_SECS", &mut config.probe.max_wait_secs);
    set_u64(
        "WAKEGATE_POLL_INTERVAL_SECS",
        &mut config.probe.poll_interval_secs,
    );

    if let Some(value) = lookup("WAKEGATE_SUSPEND_ON_STOP") {
        config.deactivation.suspend = matches!(value.as_str(), "1" | "true" | "yes");
    }
}
