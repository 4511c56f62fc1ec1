//! Operator CLI for a running wakegate instance.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gatectl")]
#[command(about = "Poke a running wakegate instance", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the readiness probe (may trigger an activation)
    Probe,
    /// Run the plain connectivity check
    Health,
    /// Send a synthetic stop signal
    Stop,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let response = match cli.command {
        Commands::Probe => {
            client
                .get(format!("{}/startupz", cli.url))
                .send()
                .await?
        }
        Commands::Health => {
            client
                .get(format!("{}/healthz", cli.url))
                .send()
                .await?
        }
        Commands::Stop => {
            // Same envelope shape the push subscription delivers.
            let envelope = serde_json::json!({
                "message": { "data": "", "messageId": "gatectl" },
                "subscription": "gatectl"
            });
            client
                .post(format!("{}/events/stop", cli.url))
                .json(&envelope)
                .send()
                .await?
        }
    };

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    println!("{status}");
    if !body.is_empty() {
        println!("{body}");
    }

    Ok(())
}
