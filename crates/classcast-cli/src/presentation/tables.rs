//! Table formatting utilities for CLI output.

use classcast_core::AdaptiveProfile;

/// Width of the profile table, separator included.
pub const PROFILE_TABLE_WIDTH: usize = 72;

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

pub fn format_profile_header() -> String {
    format!(
        "{:<10} {:>10} {:>8} {:>4} {:>11} {:>10} {:>12}",
        "PROFILE", "AUDIO", "VIDEO", "FPS", "RESOLUTION", "BUFFER", "TIMEOUT"
    )
}

/// One table row: bitrates in kbps, buffer in bytes, timeout in ms.
pub fn format_profile_row(profile: &AdaptiveProfile) -> String {
    format!(
        "{:<10} {:>7}k {}ch {:>7}k {:>4} {:>11} {:>10} {:>10}ms",
        profile.name.as_str(),
        profile.audio.bitrate_kbps,
        profile.audio.channels,
        profile.video.bitrate_kbps,
        profile.video.fps,
        profile.video.resolution,
        profile.network.buffer_size,
        profile.network.timeout_ms,
    )
}
