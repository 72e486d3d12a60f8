use crate::config::parse::load_config;
use crate::storage::{open_storage, StorageError};
use crate::web::run_server;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] crate::config::parse::ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match config_path {
        Some(path) => path,
        None => {
            eprintln!("Error: config not found");
            eprintln!("Searched locations:");
            eprintln!("  ~/.config/logs-transmitter/config.yml");
            eprintln!("  /etc/logs-transmitter/config.yml");
            eprintln!("\nUse --config <path> to specify a config file, or run 'logs-transmitter config init' to generate one.");
            std::process::exit(1);
        }
    };

    serve(&config_path).await.map_err(|e| e.into())
}

async fn serve(config_path: &Path) -> Result<(), RunError> {
    info!(config_path = %config_path.display(), "Loading configuration");
    let config = load_config(config_path)?;

    let storage = open_storage(&config.storage)?;
    storage.init_schema().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
        }
        let _ = shutdown_tx.send(true);
    });

    info!("Ready, press Ctrl+C to shutdown");
    run_server(config.server, storage, shutdown_rx).await?;

    info!("Shutdown complete");
    Ok(())
}
