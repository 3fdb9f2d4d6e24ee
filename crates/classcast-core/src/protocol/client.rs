//! Messages sent by browsers over the signaling socket.

use serde::Deserialize;
use serde_json::Value;

use super::ProtocolError;
use crate::domain::{ClassId, Role, UserId};
use crate::quality::NetworkMetrics;

/// A client → server frame.
///
/// SDP, ICE candidates, slide and audio payloads are opaque to the relay
/// and forwarded as received.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinClass {
        class_id: ClassId,
        user_id: UserId,
        role: Role,
        #[serde(default)]
        name: Option<String>,
    },
    LeaveClass,
    Offer {
        target: UserId,
        sdp: Value,
    },
    Answer {
        target: UserId,
        sdp: Value,
    },
    IceCandidate {
        target: UserId,
        candidate: Value,
    },
    SlideChange {
        slide: Value,
    },
    AudioControl {
        data: Value,
    },
    AudioChunk {
        data: Value,
    },
    NetworkReport {
        metrics: NetworkMetrics,
    },
    Ping,
}

impl ClientMessage {
    /// Parse one text frame.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// Wire name of the message type, for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::JoinClass { .. } => "join-class",
            Self::LeaveClass => "leave-class",
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::IceCandidate { .. } => "ice-candidate",
            Self::SlideChange { .. } => "slide-change",
            Self::AudioControl { .. } => "audio-control",
            Self::AudioChunk { .. } => "audio-chunk",
            Self::NetworkReport { .. } => "network-report",
            Self::Ping => "ping",
        }
    }
}
