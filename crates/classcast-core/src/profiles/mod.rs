//! Streaming profile tables.

mod adaptive;
mod presets;

use thiserror::Error;

pub use adaptive::{
    ADAPTIVE_PROFILES, AdaptiveProfile, AudioSettings, NetworkSettings, ProfileName,
    VideoSettings, lookup_or_default,
};
pub use presets::{VIDEO_PRESETS, VideoPreset, find_preset};

/// Profile lookup error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("Unknown profile: {0}")]
    Unknown(String),
}
