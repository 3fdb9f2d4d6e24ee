//! Stream handlers - live stream session operations.
//!
//! Bodies use camelCase field names; snake_case spellings are accepted too.

use axum::Json;
use axum::extract::{Path, State};
use classcast_core::{
    ClassId, DeliveryReport, ProfileName, Role, SlideAction, SlideState, StartedStream,
    StreamJoin, StreamStatus, UserId,
};
use serde::{Deserialize, Serialize};

use crate::error::HttpError;
use crate::state::AppState;

const fn teacher() -> Role {
    Role::Teacher
}

const fn student() -> Role {
    Role::Student
}

/// Result of an operation that fanned out to the room.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    pub success: bool,
    pub delivery: DeliveryReport,
}

impl From<DeliveryReport> for DeliveryResponse {
    fn from(delivery: DeliveryReport) -> Self {
        Self {
            success: true,
            delivery,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartStreamBody {
    #[serde(alias = "class_id")]
    pub class_id: ClassId,
    #[serde(alias = "teacher_id")]
    pub teacher_id: UserId,
    /// Asserted role of the caller.
    #[serde(default = "teacher")]
    pub role: Role,
}

/// Start a stream in a class.
pub async fn start(
    State(state): State<AppState>,
    Json(body): Json<StartStreamBody>,
) -> Result<Json<StartedStream>, HttpError> {
    Ok(Json(
        state
            .registry
            .start_stream(body.class_id, body.teacher_id, body.role)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopStreamBody {
    #[serde(alias = "class_id")]
    pub class_id: ClassId,
    #[serde(alias = "teacher_id")]
    pub teacher_id: UserId,
}

/// Stop the stream; only its teacher may.
pub async fn stop(
    State(state): State<AppState>,
    Json(body): Json<StopStreamBody>,
) -> Result<Json<DeliveryResponse>, HttpError> {
    let report = state
        .registry
        .stop_stream(body.class_id, body.teacher_id)
        .await?;
    Ok(Json(report.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamMemberBody {
    #[serde(alias = "class_id")]
    pub class_id: ClassId,
    #[serde(alias = "user_id")]
    pub user_id: UserId,
    #[serde(default = "student")]
    pub role: Role,
}

/// Join the active stream.
pub async fn join(
    State(state): State<AppState>,
    Json(body): Json<StreamMemberBody>,
) -> Result<Json<StreamJoin>, HttpError> {
    Ok(Json(
        state
            .registry
            .join_stream(body.class_id, body.user_id, body.role)
            .await?,
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveResponse {
    pub success: bool,
    /// Whether the user was a participant.
    pub left: bool,
}

/// Leave the stream. Succeeds even when there is no stream.
pub async fn leave(
    State(state): State<AppState>,
    Json(body): Json<StreamMemberBody>,
) -> Json<LeaveResponse> {
    let left = state.registry.leave_stream(body.class_id, body.user_id).await;
    Json(LeaveResponse {
        success: true,
        left,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSlideBody {
    #[serde(alias = "class_id")]
    pub class_id: ClassId,
    #[serde(alias = "teacher_id")]
    pub teacher_id: UserId,
    #[serde(alias = "slide_id")]
    pub slide_id: u64,
    #[serde(default, alias = "file_url")]
    pub file_url: Option<String>,
    #[serde(default, alias = "order_no")]
    pub order_no: Option<u32>,
    #[serde(default)]
    pub action: SlideAction,
}

impl SyncSlideBody {
    fn slide(&self) -> SlideState {
        let mut slide = SlideState::new(self.slide_id, self.action);
        slide.file_url = self.file_url.clone();
        slide.order_no = self.order_no;
        slide
    }
}

/// Show a slide to the class.
pub async fn sync_slide(
    State(state): State<AppState>,
    Json(body): Json<SyncSlideBody>,
) -> Result<Json<DeliveryResponse>, HttpError> {
    let report = state
        .registry
        .sync_slide(body.class_id, body.teacher_id, body.slide())
        .await?;
    Ok(Json(report.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandwidthProfileBody {
    #[serde(alias = "class_id")]
    pub class_id: ClassId,
    #[serde(alias = "user_id")]
    pub user_id: UserId,
    pub profile: String,
}

/// Record a participant's bandwidth profile.
pub async fn bandwidth_profile(
    State(state): State<AppState>,
    Json(body): Json<BandwidthProfileBody>,
) -> Result<Json<DeliveryResponse>, HttpError> {
    let profile: ProfileName = body.profile.parse()?;
    let report = state
        .registry
        .update_bandwidth_profile(body.class_id, body.user_id, profile)
        .await?;
    Ok(Json(report.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioBody {
    #[serde(alias = "class_id")]
    pub class_id: ClassId,
    #[serde(alias = "teacher_id")]
    pub teacher_id: UserId,
    pub enabled: bool,
}

/// Turn the stream's audio on or off.
pub async fn audio(
    State(state): State<AppState>,
    Json(body): Json<AudioBody>,
) -> Result<Json<DeliveryResponse>, HttpError> {
    let report = state
        .registry
        .set_audio_enabled(body.class_id, body.teacher_id, body.enabled)
        .await?;
    Ok(Json(report.into()))
}

/// Stream status of a class.
pub async fn status(
    State(state): State<AppState>,
    Path(class_id): Path<u64>,
) -> Json<StreamStatus> {
    Json(state.registry.stream_status(ClassId(class_id)).await)
}
