//! Connectivity prober.
//!
//! # Responsibilities
//! - Open a connection with an explicit, short connect timeout
//! - Run the liveness query and require the exact expected scalar
//! - Convert every driver failure into `Unreachable`

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::{Connection, MySqlConnection};

use crate::config::DatabaseConfig;
use crate::error::GateError;

/// Liveness query and the literal scalar it must return. A connection that
/// answers anything else is not usable, so it does not count as ready.
const LIVENESS_QUERY: &str = "SELECT 1";
const LIVENESS_EXPECTED: i64 = 1;

/// Result of one connectivity probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Ready,
    Unreachable(String),
}

/// Capability consumed by the wake controller and the plain health check.
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    async fn probe(&self) -> ProbeStatus;
}

/// MySQL prober used in production.
pub struct MySqlProbe {
    options: MySqlConnectOptions,
    host: String,
    timeout: Duration,
}

impl MySqlProbe {
    /// Build a prober from validated database configuration.
    ///
    /// Only local construction problems escalate; connection failures are
    /// reported per probe.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, GateError> {
        if config.host.is_empty() || config.user.is_empty() || config.name.is_empty() {
            return Err(GateError::Configuration(
                "database host, user and name are required".into(),
            ));
        }

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        Ok(Self {
            options,
            host: config.host.clone(),
            timeout: Duration::from_secs(config.connect_timeout_secs),
        })
    }

    async fn try_connect_and_query(&self) -> Result<(), String> {
        let connect = MySqlConnection::connect_with(&self.options);
        let mut conn = match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(format!("connect failed: {e}")),
            Err(_) => {
                return Err(format!(
                    "connect timed out after {}s",
                    self.timeout.as_secs()
                ))
            }
        };

        let query = sqlx::query_scalar::<_, i64>(LIVENESS_QUERY).fetch_one(&mut conn);
        let result = match tokio::time::timeout(self.timeout, query).await {
            Ok(result) => result,
            Err(_) => {
                let _ = conn.close().await;
                return Err("liveness query timed out".into());
            }
        };

        let _ = conn.close().await;
        verify_liveness(result)
    }
}

/// Check what the liveness query produced. The driver surfaces NULL and
/// non-integer results as decode errors and an empty result as a missing
/// row; a wrong integer value is rejected here.
fn verify_liveness(result: Result<i64, sqlx::Error>) -> Result<(), String> {
    match result {
        Ok(value) if value == LIVENESS_EXPECTED => Ok(()),
        Ok(value) => Err(format!(
            "liveness query returned {value}, expected {LIVENESS_EXPECTED}"
        )),
        Err(e) => Err(format!("liveness query failed: {e}")),
    }
}

#[async_trait]
impl DatabaseProbe for MySqlProbe {
    async fn probe(&self) -> ProbeStatus {
        match self.try_connect_and_query().await {
            Ok(()) => {
                tracing::debug!(host = %self.host, "Database probe succeeded");
                ProbeStatus::Ready
            }
            Err(detail) => {
                tracing::info!(host = %self.host, detail = %detail, "Database probe failed");
                ProbeStatus::Unreachable(detail)
            }
        }
    }
}
