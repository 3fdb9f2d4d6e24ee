//! Relay event handlers.
//!
//! `GET /api/events/stream` streams relay lifecycle events (rooms opening and
//! closing, members, streams, profile changes) over SSE. `POST /api/events`
//! lets the application backend push events into a class room.

use std::convert::Infallible;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use classcast_core::{ClassId, DeliveryReport};
use futures_util::stream::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HttpError;
use crate::state::AppState;

/// SSE events stream endpoint.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    state.sse.clone().subscribe()
}

/// Backend event envelope.
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub success: bool,
    pub class_id: ClassId,
    pub delivery: DeliveryReport,
}

/// Relay a backend event to the room named in its data.
pub async fn ingest(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, HttpError> {
    let (class_id, delivery) = state
        .signaling
        .ingest_backend_event(&req.event, req.data)
        .await?;
    Ok(Json(IngestResponse {
        success: true,
        class_id,
        delivery,
    }))
}
