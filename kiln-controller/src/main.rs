//! Kiln Controller binary
//!
//! Loads configuration, wires the repositories to the control plane and
//! runs the control loop until Ctrl-C.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kiln_client::ControlPlaneClient;
use kiln_controller::Config;
use kiln_controller::repository::Repositories;
use kiln_controller::scheduler::ControlLoop;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kiln_controller=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Kiln Controller");

    // Load configuration
    let config = Arc::new(load_config()?);
    info!(
        "Loaded configuration: control_plane_url={}, namespace={}",
        config.control_plane_url, config.namespace
    );

    // Initialize control plane client
    let http = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let mut client = ControlPlaneClient::with_client(config.control_plane_url.clone(), http);
    if let Some(token) = config.control_plane_token.as_deref() {
        client = client.with_token(token);
    }

    let repos = Repositories::http(Arc::new(client), config.remote_repository_timeout);
    info!("Control plane client initialized");

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl-C, shutting down"),
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
        shutdown.cancel();
    });

    let control_loop = ControlLoop::new(Arc::clone(&config), repos);
    if let Err(e) = control_loop.run(cancel).await {
        error!("Control loop error: {}", e);
        return Err(e);
    }

    info!("Kiln Controller stopped");
    Ok(())
}

/// Loads configuration from environment variables with fallback to defaults
fn load_config() -> Result<Config> {
    match Config::from_env() {
        Ok(config) => {
            config.validate()?;
            Ok(config)
        }
        Err(_) => {
            info!("Failed to load config from environment, using defaults");
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}
