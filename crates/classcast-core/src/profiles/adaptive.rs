//! Adaptive streaming profiles.
//!
//! Six profiles ordered from the most conservative (`emergency`) to the
//! richest (`excellent`). Each bundles the audio, video and transport
//! parameters a client should use under the matching network conditions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ProfileError;

/// Name of an adaptive profile, ordered lowest to highest quality.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProfileName {
    Emergency,
    Critical,
    Poor,
    #[default]
    Fair,
    Good,
    Excellent,
}

impl ProfileName {
    /// All profiles in ascending quality order.
    pub const ALL: [Self; 6] = [
        Self::Emergency,
        Self::Critical,
        Self::Poor,
        Self::Fair,
        Self::Good,
        Self::Excellent,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Critical => "critical",
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }

    /// The next richer profile, saturating at `excellent`.
    #[must_use]
    pub const fn step_up(self) -> Self {
        match self {
            Self::Emergency => Self::Critical,
            Self::Critical => Self::Poor,
            Self::Poor => Self::Fair,
            Self::Fair => Self::Good,
            Self::Good | Self::Excellent => Self::Excellent,
        }
    }

    /// The next more conservative profile, saturating at `emergency`.
    #[must_use]
    pub const fn step_down(self) -> Self {
        match self {
            Self::Emergency | Self::Critical => Self::Emergency,
            Self::Poor => Self::Critical,
            Self::Fair => Self::Poor,
            Self::Good => Self::Fair,
            Self::Excellent => Self::Good,
        }
    }

    /// Parameters for this profile.
    pub fn profile(self) -> &'static AdaptiveProfile {
        &ADAPTIVE_PROFILES[self as usize]
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileName {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == normalized)
            .ok_or_else(|| ProfileError::Unknown(s.to_string()))
    }
}

/// Audio encoder parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSettings {
    pub bitrate_kbps: u32,
    pub sample_rate: u32,
    pub channels: u8,
    pub codec: &'static str,
}

/// Video encoder parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSettings {
    pub bitrate_kbps: u32,
    pub fps: u32,
    pub resolution: &'static str,
    pub codec: &'static str,
}

/// Client-side transport parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSettings {
    pub buffer_size: u32,
    pub chunk_size: u32,
    pub retry_attempts: u32,
    pub timeout_ms: u64,
}

/// A complete adaptive profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveProfile {
    pub name: ProfileName,
    pub audio: AudioSettings,
    pub video: VideoSettings,
    pub network: NetworkSettings,
}

impl AdaptiveProfile {
    pub fn for_name(name: ProfileName) -> &'static Self {
        name.profile()
    }
}

const AUDIO_CODEC: &str = "opus";
const VIDEO_CODEC: &str = "h264";

const fn profile(
    name: ProfileName,
    audio: (u32, u32, u8),
    video: (u32, u32, &'static str),
    network: (u32, u32, u32, u64),
) -> AdaptiveProfile {
    AdaptiveProfile {
        name,
        audio: AudioSettings {
            bitrate_kbps: audio.0,
            sample_rate: audio.1,
            channels: audio.2,
            codec: AUDIO_CODEC,
        },
        video: VideoSettings {
            bitrate_kbps: video.0,
            fps: video.1,
            resolution: video.2,
            codec: VIDEO_CODEC,
        },
        network: NetworkSettings {
            buffer_size: network.0,
            chunk_size: network.1,
            retry_attempts: network.2,
            timeout_ms: network.3,
        },
    }
}

/// The profile table, indexed by `ProfileName as usize`.
pub static ADAPTIVE_PROFILES: [AdaptiveProfile; 6] = [
    profile(
        ProfileName::Emergency,
        (8, 16_000, 1),
        (25, 3, "240x180"),
        (512, 256, 5, 30_000),
    ),
    profile(
        ProfileName::Critical,
        (16, 22_050, 1),
        (50, 5, "320x240"),
        (1024, 512, 3, 20_000),
    ),
    profile(
        ProfileName::Poor,
        (32, 44_100, 1),
        (100, 10, "480x360"),
        (2048, 1024, 2, 15_000),
    ),
    profile(
        ProfileName::Fair,
        (64, 44_100, 2),
        (200, 15, "640x480"),
        (4096, 2048, 2, 10_000),
    ),
    profile(
        ProfileName::Good,
        (128, 44_100, 2),
        (400, 24, "854x480"),
        (8192, 4096, 1, 8_000),
    ),
    profile(
        ProfileName::Excellent,
        (192, 48_000, 2),
        (800, 30, "1280x720"),
        (16_384, 8192, 1, 5_000),
    ),
];

/// Look up a profile by name, falling back to `fair` for unknown names.
pub fn lookup_or_default(name: &str) -> &'static AdaptiveProfile {
    name.parse::<ProfileName>().map_or_else(
        |_| {
            tracing::debug!(profile = %name, "Unknown profile requested, using fair");
            ProfileName::Fair.profile()
        },
        ProfileName::profile,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_name() {
        for name in ProfileName::ALL {
            assert_eq!(name.profile().name, name);
        }
    }

    #[test]
    fn test_profiles_increase_monotonically() {
        for pair in ADAPTIVE_PROFILES.windows(2) {
            assert!(pair[0].audio.bitrate_kbps < pair[1].audio.bitrate_kbps);
            assert!(pair[0].video.bitrate_kbps < pair[1].video.bitrate_kbps);
            assert!(pair[0].network.buffer_size < pair[1].network.buffer_size);
            assert!(pair[0].network.timeout_ms >= pair[1].network.timeout_ms);
        }
    }

    #[test]
    fn test_step_saturates() {
        assert_eq!(ProfileName::Excellent.step_up(), ProfileName::Excellent);
        assert_eq!(ProfileName::Emergency.step_down(), ProfileName::Emergency);
        assert_eq!(ProfileName::Fair.step_up(), ProfileName::Good);
        assert_eq!(ProfileName::Fair.step_down(), ProfileName::Poor);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("GOOD".parse::<ProfileName>().unwrap(), ProfileName::Good);
        assert_eq!(" poor".parse::<ProfileName>().unwrap(), ProfileName::Poor);
        assert!(matches!(
            "medium".parse::<ProfileName>(),
            Err(ProfileError::Unknown(name)) if name == "medium"
        ));
    }

    #[test]
    fn test_lookup_or_default_falls_back_to_fair() {
        assert_eq!(lookup_or_default("nonsense").name, ProfileName::Fair);
        assert_eq!(lookup_or_default("critical").name, ProfileName::Critical);
    }

    #[test]
    fn test_profile_serialization_camel_case() {
        let json = serde_json::to_value(ProfileName::Emergency.profile()).unwrap();
        assert_eq!(json["name"], "emergency");
        assert_eq!(json["audio"]["sampleRate"], 16_000);
        assert_eq!(json["video"]["resolution"], "240x180");
        assert_eq!(json["network"]["timeoutMs"], 30_000);
    }
}
