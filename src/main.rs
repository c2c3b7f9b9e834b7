//! CLI for Beacon
//!
//! Subcommands:
//! - `server`: run the HTTP/SSE server
//! - `publish`: post one message to a running server (useful for smoke tests)

use std::sync::Arc;

use beacon::broker::{Heartbeat, Registry};
use beacon::config::load_config;
use beacon::transport::{self, AppState};
use beacon::utils::logging;
use clap::Parser;
use serde_json::{Value, json};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "beacon")]
enum Command {
    /// Start the HTTP/SSE server
    Server,
    /// Publish a message to a channel on a running server
    Publish {
        /// Base URL of the server
        #[arg(long, env = "BEACON_URL", default_value = "http://127.0.0.1:3000")]
        url: String,
        /// Channel to publish to
        channel: String,
        /// Message text
        message: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cmd = Command::parse();

    match cmd {
        Command::Server => {
            if let Err(e) = run_server().await {
                error!("Server failed: {}", e);
            }
        }
        Command::Publish {
            url,
            channel,
            message,
        } => {
            logging::init("warn");
            if let Err(e) = run_publish(&url, &channel, &message).await {
                error!("Publish failed: {}", e);
            }
        }
    }
}

async fn run_server() -> Result<(), Box<dyn std::error::Error>> {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            return Err(e.into());
        }
    };
    logging::init(&config.logging.level);

    let registry = Arc::new(Registry::with_grace(config.broker.reaper_grace()));
    let heartbeat = Heartbeat::new(registry.clone(), config.broker.heartbeat_interval()).spawn();

    let listener = transport::bind(&config.server.addr()).await?;
    let state = AppState::new(registry, config.auth.clone());

    tokio::select! {
        result = transport::serve(listener, state) => {
            if let Err(e) = result {
                error!("HTTP server exited unexpectedly: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    heartbeat.abort();
    Ok(())
}

async fn run_publish(
    url: &str,
    channel: &str,
    message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let endpoint = format!("{}/broadcast/{channel}", url.trim_end_matches('/'));

    let resp = reqwest::Client::new()
        .post(&endpoint)
        .json(&json!({ "message": message }))
        .send()
        .await?;

    let status = resp.status();
    let body: Value = resp.json().await?;
    println!("{status} {body}");

    Ok(())
}
