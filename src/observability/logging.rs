//! Structured logging initialization.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber. `RUST_LOG` wins over the configured
/// level.
pub fn init_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!("wakegate={log_level},tower_http=warn"))
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
