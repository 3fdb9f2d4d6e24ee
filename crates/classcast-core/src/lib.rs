//! Core domain for the classcast signaling relay.
//!
//! Rooms, connections and live-stream sessions, the adaptive profile table,
//! network quality scoring and the signaling wire protocol. Nothing here
//! opens a socket: transports plug in through the traits in [`ports`].

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod events;
pub mod ports;
pub mod profiles;
pub mod protocol;
pub mod quality;
pub mod registry;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    ClassId, ConnectionId, DEFAULT_STUN_URLS, IceServer, Role, SlideAction, SlideState, UserId,
    default_ice_servers,
};
pub use events::RelayEvent;
pub use ports::{CoreError, Delivery, NoopEmitter, PeerSink, RecordingSink, RelayEventEmitter};
pub use profiles::{
    ADAPTIVE_PROFILES, AdaptiveProfile, ProfileError, ProfileName, VIDEO_PRESETS, VideoPreset,
    find_preset, lookup_or_default,
};
pub use protocol::{BackendEventKind, ClientMessage, ErrorCode, ProtocolError, ServerMessage};
pub use quality::{
    NetworkMetrics, QualityAssessment, QualityError, QualityScore, QualityTracker,
    Recommendation, Trend, UserQuality, recommend,
};
pub use registry::{
    DeliveryReport, JoinSnapshot, MemberInfo, Participant, ParticipantInfo, RelayError,
    RoomRegistry, RoomSummary, StartedStream, StreamDetails, StreamJoin, StreamStatus,
};
pub use services::SignalingService;
pub use settings::{
    DEFAULT_PORT, RelaySettings, SettingsError, SettingsOverrides, validate_settings,
};
