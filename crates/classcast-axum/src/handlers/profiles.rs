//! Profile handlers - adaptive profiles and video presets.

use axum::Json;
use axum::extract::Path;
use classcast_core::{ADAPTIVE_PROFILES, AdaptiveProfile, ProfileName, VIDEO_PRESETS, VideoPreset};

use crate::error::HttpError;

/// List adaptive profiles, lowest quality first.
pub async fn list() -> Json<&'static [AdaptiveProfile]> {
    Json(ADAPTIVE_PROFILES.as_slice())
}

/// Get one adaptive profile by name.
pub async fn get(Path(name): Path<String>) -> Result<Json<&'static AdaptiveProfile>, HttpError> {
    let name: ProfileName = name.parse()?;
    Ok(Json(name.profile()))
}

/// List fixed video presets.
pub async fn presets() -> Json<&'static [VideoPreset]> {
    Json(VIDEO_PRESETS.as_slice())
}
