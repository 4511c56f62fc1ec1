//! wakegate: scale-to-zero readiness gate.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                  WAKEGATE                    │
//!                         │                                              │
//!  orchestrator probe     │  ┌────────┐   ┌──────────────────────────┐   │
//!  ───────────────────────┼─▶│  http  │──▶│      wake controller     │   │
//!  (GET /startupz)        │  │ server │   │ prober → classify →      │   │
//!                         │  └────────┘   │ decide → dispatch        │   │
//!                         │       │       └─────┬──────────────┬─────┘   │
//!  idle-timeout push      │       │             │              │         │
//!  ───────────────────────┼───────┘             ▼              ▼         │
//!  (POST /events/stop)    │  ┌────────────┐  ┌──────┐   ┌─────────────┐  │
//!                         │  │ deactivate │  │  db  │   │    cloud    │  │
//!                         │  │  handler   │  │probe │   │control plane│  │
//!                         │  └─────┬──────┘  └──┬───┘   └──────┬──────┘  │
//!                         │        │            │              │         │
//!                         │  ┌─────────────────────────────────────────┐ │
//!                         │  │   config  ·  observability  ·  error    │ │
//!                         │  └─────────────────────────────────────────┘ │
//!                         └────────┼────────────┼──────────────┼─────────┘
//!                                  ▼            ▼              ▼
//!                            stop/suspend    MySQL      Compute / SQL Admin
//!                                API       (data plane)     REST APIs
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use wakegate::config::load_config;
use wakegate::observability::init_logging;
use wakegate::GateServer;

#[derive(Parser)]
#[command(name = "wakegate")]
#[command(about = "Scale-to-zero readiness gate for a WordPress database backend")]
struct Cli {
    /// Path to a TOML configuration file. Environment variables overlay it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            // Logging is not up yet; this must still reach the operator.
            eprintln!("wakegate: configuration error: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        resource = %config.resource.instance,
        kind = %config.resource.kind,
        db_host = %config.database.host,
        connect_timeout_secs = config.database.connect_timeout_secs,
        max_wait_secs = config.probe.max_wait_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = GateServer::from_config(&config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
