//! Room handlers - read-only views of class rooms.

use axum::Json;
use axum::extract::{Path, State};
use classcast_core::{ClassId, RelayError, RoomSummary};

use crate::error::HttpError;
use crate::state::AppState;

/// List all rooms, ordered by class.
pub async fn list(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    Json(state.registry.rooms().await)
}

/// Get one room.
pub async fn get(
    State(state): State<AppState>,
    Path(class_id): Path<u64>,
) -> Result<Json<RoomSummary>, HttpError> {
    let class_id = ClassId(class_id);
    state
        .registry
        .room_summary(class_id)
        .await
        .map(Json)
        .ok_or_else(|| RelayError::RoomNotFound(class_id).into())
}
