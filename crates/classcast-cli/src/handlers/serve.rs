//! Serve command handler.

use anyhow::Result;
use classcast_axum::{ServerConfig, start_server};
use classcast_core::RelaySettings;
use tracing::info;

/// Run the relay until Ctrl+C.
pub async fn execute(settings: RelaySettings) -> Result<()> {
    let config = ServerConfig::from_settings(settings);
    info!(
        bind = %config.bind_addr(),
        cors = ?config.cors,
        "Starting classcast relay"
    );
    start_server(config).await
}
