//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where the relay is wired together for the
//! Axum adapter: the SSE broadcaster becomes the registry's event emitter,
//! and the registry is handed to the signaling service.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use classcast_core::ports::RelayEventEmitter;
use classcast_core::{RelaySettings, RoomRegistry, SignalingService, validate_settings};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use crate::sse::SseBroadcaster;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

impl CorsConfig {
    /// An empty list allows any origin.
    pub fn from_origins(origins: &[String]) -> Self {
        if origins.is_empty() {
            Self::AllowAll
        } else {
            Self::AllowOrigins(origins.to_vec())
        }
    }
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Relay settings (port, queues, ICE servers, ...).
    pub settings: RelaySettings,
    /// CORS configuration.
    pub cors: CorsConfig,
}

impl ServerConfig {
    pub fn from_settings(settings: RelaySettings) -> Self {
        let cors = CorsConfig::from_origins(&settings.allowed_origins);
        Self { settings, cors }
    }

    /// Address string the listener binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.settings.bind_address, self.settings.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_settings(RelaySettings::default())
    }
}

/// Application context for the Axum adapter.
///
/// Holds every service the handlers need.
pub struct AxumContext {
    /// Signaling service (owns the quality tracker).
    pub signaling: Arc<SignalingService>,
    /// Room registry shared with the signaling service.
    pub registry: Arc<RoomRegistry>,
    /// SSE broadcaster for relay lifecycle events.
    pub sse: Arc<SseBroadcaster>,
    /// Effective settings.
    pub settings: Arc<RelaySettings>,
}

/// Build the relay services from validated settings.
pub fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    validate_settings(&config.settings).context("Invalid relay settings")?;

    let sse = Arc::new(SseBroadcaster::with_defaults());
    let registry = Arc::new(RoomRegistry::new(
        sse.clone() as Arc<dyn RelayEventEmitter>,
        config.settings.ice_servers.clone(),
    ));
    let signaling = Arc::new(SignalingService::new(registry.clone(), &config.settings));

    info!(
        ice_servers = config.settings.ice_servers.len(),
        outbound_queue = config.settings.outbound_queue_capacity,
        max_message_bytes = config.settings.max_message_bytes,
        quality_history = config.settings.quality_history,
        "Relay services initialised"
    );

    Ok(AxumContext {
        signaling,
        registry,
        sse,
        settings: Arc::new(config.settings.clone()),
    })
}

/// Start the relay and serve until Ctrl+C.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let ctx = bootstrap(&config)?;
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("classcast relay listening on http://{}", listener.local_addr()?);
    info!("Signaling WebSocket at ws://{}/ws", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("classcast relay stopped");
    Ok(())
}

/// Start the relay in the background.
///
/// Binds `bind_address` with the configured port (use port 0 for an
/// ephemeral one) and returns the bound address with the server task.
pub async fn spawn_server(
    config: ServerConfig,
) -> Result<(SocketAddr, Arc<AxumContext>, JoinHandle<()>)> {
    let state = Arc::new(bootstrap(&config)?);
    let app = crate::routes::create_router_with_state(state.clone(), &config.cors);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    let addr = listener.local_addr()?;

    info!(addr = %addr, "Starting relay server");

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Relay server error");
        }
    });

    Ok((addr, state, handle))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
