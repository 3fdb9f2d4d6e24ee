//! Messages the relay sends to browsers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ClassId, ConnectionId, IceServer, Role, UserId};
use crate::profiles::{AdaptiveProfile, ProfileName};
use crate::quality::QualityAssessment;
use crate::registry::{ParticipantInfo, StreamStatus};

/// Stable error codes carried by `error` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotJoined,
    Forbidden,
    TargetNotFound,
    BadMessage,
    MessageTooLarge,
    InvalidMetrics,
    NoActiveStream,
    Conflict,
    Internal,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotJoined => "NOT_JOINED",
            Self::Forbidden => "FORBIDDEN",
            Self::TargetNotFound => "TARGET_NOT_FOUND",
            Self::BadMessage => "BAD_MESSAGE",
            Self::MessageTooLarge => "MESSAGE_TOO_LARGE",
            Self::InvalidMetrics => "INVALID_METRICS",
            Self::NoActiveStream => "NO_ACTIVE_STREAM",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL",
        }
    }
}

/// Events an application backend may push through `POST /api/events`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendEventKind {
    StreamStarted,
    StreamStopped,
    UserJoinedStream,
    UserLeftStream,
    SlideSync,
    BandwidthUpdate,
}

/// A server → client frame.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Reply to `join-class`.
    #[serde(rename_all = "camelCase")]
    Joined {
        class_id: ClassId,
        connection_id: ConnectionId,
        participants: Vec<ParticipantInfo>,
        stream: StreamStatus,
        ice_servers: Vec<IceServer>,
    },
    #[serde(rename_all = "camelCase")]
    UserJoined {
        user_id: UserId,
        role: Role,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    UserLeft { user_id: UserId },
    Offer { from: UserId, sdp: Value },
    Answer { from: UserId, sdp: Value },
    IceCandidate { from: UserId, candidate: Value },
    SlideChange { from: UserId, slide: Value },
    AudioControl { from: UserId, data: Value },
    AudioChunk { from: UserId, data: Value },
    /// Reply to `network-report`.
    QualityProfile {
        assessment: QualityAssessment,
        profile: &'static AdaptiveProfile,
    },
    #[serde(rename_all = "camelCase")]
    BandwidthUpdate {
        user_id: UserId,
        profile: ProfileName,
    },
    #[serde(rename_all = "camelCase")]
    StreamStarted {
        class_id: ClassId,
        teacher_id: UserId,
        stream_id: String,
        started_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    StreamStopped {
        class_id: ClassId,
        teacher_id: UserId,
    },
    #[serde(rename_all = "camelCase")]
    UserJoinedStream {
        class_id: ClassId,
        user_id: UserId,
        role: Role,
    },
    #[serde(rename_all = "camelCase")]
    UserLeftStream { class_id: ClassId, user_id: UserId },
    /// Event forwarded from the application backend.
    Notification { event: BackendEventKind, data: Value },
    /// This connection's membership was taken over by a newer connection of
    /// the same user.
    Replaced,
    Pong,
    Error { code: ErrorCode, message: String },
}

impl ServerMessage {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }

    /// Wire name of the message type, for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Joined { .. } => "joined",
            Self::UserJoined { .. } => "user-joined",
            Self::UserLeft { .. } => "user-left",
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::IceCandidate { .. } => "ice-candidate",
            Self::SlideChange { .. } => "slide-change",
            Self::AudioControl { .. } => "audio-control",
            Self::AudioChunk { .. } => "audio-chunk",
            Self::QualityProfile { .. } => "quality-profile",
            Self::BandwidthUpdate { .. } => "bandwidth-update",
            Self::StreamStarted { .. } => "stream-started",
            Self::StreamStopped { .. } => "stream-stopped",
            Self::UserJoinedStream { .. } => "user-joined-stream",
            Self::UserLeftStream { .. } => "user-left-stream",
            Self::Notification { .. } => "notification",
            Self::Replaced => "replaced",
            Self::Pong => "pong",
            Self::Error { .. } => "error",
        }
    }

    /// Serialize to a text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
