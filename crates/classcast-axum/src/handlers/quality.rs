//! Quality handlers - scoring and per-user tracker state.

use axum::Json;
use axum::extract::{Path, State};
use classcast_core::{NetworkMetrics, Recommendation, UserId, UserQuality, recommend};

use crate::error::HttpError;
use crate::state::AppState;

/// Score metrics and recommend a profile without recording anything.
pub async fn assess(Json(metrics): Json<NetworkMetrics>) -> Result<Json<Recommendation>, HttpError> {
    Ok(Json(recommend(metrics)?))
}

/// Tracked quality for a user.
pub async fn user(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<UserQuality>, HttpError> {
    state
        .signaling
        .user_quality(UserId(user_id))
        .await
        .map(Json)
        .ok_or_else(|| HttpError::NotFound(format!("No quality reports for user {user_id}")))
}
