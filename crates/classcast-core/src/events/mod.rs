//! Relay lifecycle events.
//!
//! These describe what happened inside the relay (rooms opening, members
//! joining, streams starting, profiles changing) for observers such as the
//! SSE endpoint. They are not sent to room members.
//!
//! # Wire Format
//!
//! ```json
//! { "type": "member_joined", "classId": 4, "userId": 17, "role": "student" }
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{ClassId, Role, UserId};
use crate::profiles::ProfileName;

/// Canonical relay event union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayEvent {
    #[serde(rename_all = "camelCase")]
    RoomOpened { class_id: ClassId },

    #[serde(rename_all = "camelCase")]
    RoomClosed { class_id: ClassId },

    #[serde(rename_all = "camelCase")]
    MemberJoined {
        class_id: ClassId,
        user_id: UserId,
        role: Role,
    },

    #[serde(rename_all = "camelCase")]
    MemberLeft { class_id: ClassId, user_id: UserId },

    #[serde(rename_all = "camelCase")]
    StreamStarted { class_id: ClassId, teacher_id: UserId },

    #[serde(rename_all = "camelCase")]
    StreamStopped { class_id: ClassId, teacher_id: UserId },

    #[serde(rename_all = "camelCase")]
    ProfileChanged {
        user_id: UserId,
        #[serde(skip_serializing_if = "Option::is_none")]
        class_id: Option<ClassId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        from: Option<ProfileName>,
        to: ProfileName,
    },
}

impl RelayEvent {
    /// Class the event concerns, if any.
    pub const fn class_id(&self) -> Option<ClassId> {
        match self {
            Self::RoomOpened { class_id }
            | Self::RoomClosed { class_id }
            | Self::MemberJoined { class_id, .. }
            | Self::MemberLeft { class_id, .. }
            | Self::StreamStarted { class_id, .. }
            | Self::StreamStopped { class_id, .. } => Some(*class_id),
            Self::ProfileChanged { class_id, .. } => *class_id,
        }
    }
}
