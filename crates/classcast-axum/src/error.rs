//! Axum-specific error types and mappings.
//!
//! Maps core errors to HTTP status codes and JSON bodies of the form
//! `{ "error": "...", "status": 409, "type": "CONFLICT" }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use classcast_core::{CoreError, ProfileError, QualityError, RelayError};
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Room or stream operation rejected.
    #[error(transparent)]
    Relay(RelayError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
    /// Stable error type discriminant for client-side handling
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    error_type: Option<&'static str>,
}

const fn relay_status(err: &RelayError) -> StatusCode {
    match err {
        RelayError::NotJoined => StatusCode::BAD_REQUEST,
        RelayError::NotTeacher(_) | RelayError::NotStreamOwner { .. } => StatusCode::FORBIDDEN,
        RelayError::StreamAlreadyActive(_) => StatusCode::CONFLICT,
        RelayError::NoActiveStream(_)
        | RelayError::TargetNotFound { .. }
        | RelayError::RoomNotFound(_)
        | RelayError::UnknownConnection(_) => StatusCode::NOT_FOUND,
        RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message, error_type) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            Self::Relay(err) => (relay_status(err), err.to_string(), Some(err.code().as_str())),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), None),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
            error_type,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<RelayError> for HttpError {
    fn from(err: RelayError) -> Self {
        Self::Relay(err)
    }
}

impl From<ProfileError> for HttpError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::Unknown(name) => Self::NotFound(format!("Unknown profile: {name}")),
        }
    }
}

impl From<QualityError> for HttpError {
    fn from(err: QualityError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<CoreError> for HttpError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Relay(relay_err) => relay_err.into(),
            CoreError::Profile(profile_err) => profile_err.into(),
            CoreError::Quality(quality_err) => quality_err.into(),
            CoreError::Settings(settings_err) => Self::BadRequest(settings_err.to_string()),
            CoreError::Protocol(protocol_err) => Self::BadRequest(protocol_err.to_string()),
            CoreError::Validation(msg) => Self::BadRequest(msg),
            CoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}
