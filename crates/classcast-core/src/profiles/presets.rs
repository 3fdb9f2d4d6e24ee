//! Fixed video quality presets for clients that negotiate a preset by name
//! instead of following adaptive profile changes.

use serde::Serialize;

/// A named encoder preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPreset {
    pub name: &'static str,
    pub resolution: &'static str,
    pub bitrate_kbps: u32,
    pub fps: u32,
    pub crf: u8,
    pub encoder_preset: &'static str,
    pub description: &'static str,
}

pub static VIDEO_PRESETS: [VideoPreset; 6] = [
    VideoPreset {
        name: "ultra_low",
        resolution: "320x240",
        bitrate_kbps: 50,
        fps: 5,
        crf: 35,
        encoder_preset: "ultrafast",
        description: "Ultra Low - emergency mode for very poor connections",
    },
    VideoPreset {
        name: "low",
        resolution: "480x360",
        bitrate_kbps: 100,
        fps: 10,
        crf: 32,
        encoder_preset: "ultrafast",
        description: "Low - basic quality for poor connections",
    },
    VideoPreset {
        name: "medium",
        resolution: "640x480",
        bitrate_kbps: 200,
        fps: 15,
        crf: 28,
        encoder_preset: "fast",
        description: "Medium - balanced quality and bandwidth",
    },
    VideoPreset {
        name: "high",
        resolution: "854x480",
        bitrate_kbps: 400,
        fps: 24,
        crf: 25,
        encoder_preset: "medium",
        description: "High - good quality for stable connections",
    },
    VideoPreset {
        name: "very_high",
        resolution: "1280x720",
        bitrate_kbps: 800,
        fps: 30,
        crf: 22,
        encoder_preset: "slow",
        description: "Very High - excellent quality for good connections",
    },
    VideoPreset {
        name: "ultra_high",
        resolution: "1920x1080",
        bitrate_kbps: 1500,
        fps: 30,
        crf: 20,
        encoder_preset: "slower",
        description: "Ultra High - best quality for excellent connections",
    },
];

/// Find a preset by name (case-insensitive, `-` and `_` interchangeable).
pub fn find_preset(name: &str) -> Option<&'static VideoPreset> {
    let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
    VIDEO_PRESETS.iter().find(|p| p.name == normalized)
}
