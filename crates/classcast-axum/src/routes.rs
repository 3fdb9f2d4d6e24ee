//! Route definitions and router construction.
//!
//! Root routes carry the browser-facing surface (`/health`, `/config`,
//! `/ws`); the REST API is nested under `/api`.

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Build all API routes without the `/api` prefix (for nesting under /api).
///
/// The caller applies `.with_state()`.
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        // Backend events
        .route("/events", post(handlers::events::ingest))
        .route("/events/stream", get(handlers::events::stream))
        // Rooms
        .route("/rooms", get(handlers::rooms::list))
        .route("/rooms/{class_id}", get(handlers::rooms::get))
        // Profiles
        .route("/profiles", get(handlers::profiles::list))
        .route("/profiles/{name}", get(handlers::profiles::get))
        .route("/presets", get(handlers::profiles::presets))
        // Quality
        .route("/quality/assess", post(handlers::quality::assess))
        .route("/quality/{user_id}", get(handlers::quality::user))
        // Streams
        .route("/streams/start", post(handlers::streams::start))
        .route("/streams/stop", post(handlers::streams::stop))
        .route("/streams/join", post(handlers::streams::join))
        .route("/streams/leave", post(handlers::streams::leave))
        .route("/streams/sync-slide", post(handlers::streams::sync_slide))
        .route(
            "/streams/bandwidth-profile",
            post(handlers::streams::bandwidth_profile),
        )
        .route("/streams/audio", post(handlers::streams::audio))
        .route("/streams/{class_id}", get(handlers::streams::status))
        // ICE
        .route("/ice-servers", get(handlers::config::ice_servers))
}

/// Create the main Axum router.
///
/// # Path Parameter Syntax
/// Axum 0.8 uses brace syntax for path parameters: `{class_id}`, `{name}`
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    create_router_with_state(Arc::new(ctx), cors_config)
}

/// Create the router around already shared state.
pub fn create_router_with_state(state: AppState, cors_config: &CorsConfig) -> Router {
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(health_check))
        .route("/config", get(handlers::config::ice_servers))
        .route("/ws", get(handlers::signaling::signaling_ws))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
