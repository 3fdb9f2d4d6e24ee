//! Live stream sessions and the read-only views built from registry state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::RelayError;
use crate::domain::{ClassId, ConnectionId, IceServer, Role, SlideState, UserId};
use crate::profiles::ProfileName;

/// One user taking part in a live stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: UserId,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
    pub audio_enabled: bool,
    pub bandwidth_profile: ProfileName,
}

/// A teacher's live stream in one class.
#[derive(Debug, Clone)]
pub struct StreamSession {
    pub class_id: ClassId,
    pub teacher_id: UserId,
    pub started_at: DateTime<Utc>,
    pub participants: BTreeMap<UserId, Participant>,
    pub current_slide: Option<SlideState>,
    pub audio_enabled: bool,
    pub slide_sync_enabled: bool,
}

impl StreamSession {
    /// Start a session with the teacher as its first participant.
    pub fn new(class_id: ClassId, teacher_id: UserId) -> Self {
        let started_at = Utc::now();
        let mut participants = BTreeMap::new();
        participants.insert(
            teacher_id,
            Participant {
                user_id: teacher_id,
                role: Role::Teacher,
                joined_at: started_at,
                audio_enabled: true,
                bandwidth_profile: ProfileName::default(),
            },
        );
        Self {
            class_id,
            teacher_id,
            started_at,
            participants,
            current_slide: None,
            audio_enabled: true,
            slide_sync_enabled: true,
        }
    }

    pub fn stream_id(&self) -> String {
        format!("stream_{}_{}", self.class_id, self.teacher_id)
    }

    pub fn ensure_owner(&self, user_id: UserId) -> Result<(), RelayError> {
        if self.teacher_id == user_id {
            Ok(())
        } else {
            Err(RelayError::NotStreamOwner {
                class_id: self.class_id,
                user_id,
            })
        }
    }

    /// Add a participant, keeping the original entry on re-join.
    pub fn add_participant(&mut self, user_id: UserId, role: Role) -> &Participant {
        self.participants.entry(user_id).or_insert_with(|| Participant {
            user_id,
            role,
            joined_at: Utc::now(),
            audio_enabled: true,
            bandwidth_profile: ProfileName::default(),
        })
    }

    pub fn remove_participant(&mut self, user_id: UserId) -> Option<Participant> {
        self.participants.remove(&user_id)
    }

    /// Record a participant's profile. Returns `false` for non-participants.
    pub fn set_bandwidth_profile(&mut self, user_id: UserId, profile: ProfileName) -> bool {
        match self.participants.get_mut(&user_id) {
            Some(participant) => {
                participant.bandwidth_profile = profile;
                true
            }
            None => false,
        }
    }

    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.audio_enabled = enabled;
        if let Some(teacher) = self.participants.get_mut(&self.teacher_id) {
            teacher.audio_enabled = enabled;
        }
    }

    pub fn details(&self) -> StreamDetails {
        StreamDetails {
            class_id: self.class_id,
            teacher_id: self.teacher_id,
            stream_id: self.stream_id(),
            started_at: self.started_at,
            participants_count: self.participants.len(),
            participants: self.participants.values().cloned().collect(),
            current_slide: self.current_slide.clone(),
            audio_enabled: self.audio_enabled,
            slide_sync_enabled: self.slide_sync_enabled,
        }
    }
}

/// Snapshot of an active stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDetails {
    pub class_id: ClassId,
    pub teacher_id: UserId,
    pub stream_id: String,
    pub started_at: DateTime<Utc>,
    pub participants_count: usize,
    pub participants: Vec<Participant>,
    pub current_slide: Option<SlideState>,
    pub audio_enabled: bool,
    pub slide_sync_enabled: bool,
}

/// Stream status of a class: `{ "active": false }` or the full details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamStatus {
    pub active: bool,
    #[serde(flatten)]
    pub details: Option<StreamDetails>,
}

impl StreamStatus {
    pub const fn inactive() -> Self {
        Self {
            active: false,
            details: None,
        }
    }

    pub(crate) fn of(session: Option<&StreamSession>) -> Self {
        session.map_or_else(Self::inactive, |session| Self {
            active: true,
            details: Some(session.details()),
        })
    }
}

/// Result of starting a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedStream {
    pub class_id: ClassId,
    pub teacher_id: UserId,
    pub stream_id: String,
    pub started_at: DateTime<Utc>,
}

/// Result of joining a stream: what a viewer needs to connect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamJoin {
    pub stream: StreamDetails,
    pub ice_servers: Vec<IceServer>,
}

/// A room member as other members see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub joined_at: DateTime<Utc>,
}

/// Read-only view of one room.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub class_id: ClassId,
    pub member_count: usize,
    pub members: Vec<ParticipantInfo>,
    pub stream: StreamStatus,
}

/// What a connection learns when it joins a class.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSnapshot {
    pub class_id: ClassId,
    pub connection_id: ConnectionId,
    /// Every member of the room, the joining connection included.
    pub participants: Vec<ParticipantInfo>,
    pub stream: StreamStatus,
    pub ice_servers: Vec<IceServer>,
}

impl JoinSnapshot {
    pub fn current_slide(&self) -> Option<&SlideState> {
        self.stream
            .details
            .as_ref()
            .and_then(|details| details.current_slide.as_ref())
    }
}
