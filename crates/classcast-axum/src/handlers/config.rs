//! Client configuration handlers.

use axum::Json;
use axum::extract::State;
use classcast_core::IceServer;
use serde::Serialize;

use crate::state::AppState;

/// ICE servers a browser should pass to `RTCPeerConnection`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IceConfig {
    pub ice_servers: Vec<IceServer>,
}

/// `GET /config` and `GET /api/ice-servers`.
pub async fn ice_servers(State(state): State<AppState>) -> Json<IceConfig> {
    Json(IceConfig {
        ice_servers: state.registry.ice_servers().to_vec(),
    })
}
