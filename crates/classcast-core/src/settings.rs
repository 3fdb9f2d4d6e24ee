//! Relay settings and validation.
//!
//! Settings come from an optional JSON file and are then overlaid with
//! command-line or environment overrides. All fields have defaults, so an
//! empty object (or no file at all) is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{IceServer, default_ice_servers};
use crate::quality::{DEFAULT_HISTORY, TREND_MIN_SAMPLES};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3001;

/// Default bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// Default per-connection outbound queue capacity.
pub const DEFAULT_OUTBOUND_QUEUE: usize = 256;

/// Default maximum inbound frame size in bytes.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 64 * 1024;

/// Default interval between server pings, in seconds.
pub const DEFAULT_PING_INTERVAL_SECS: u64 = 25;

/// Relay settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelaySettings {
    pub port: u16,
    pub bind_address: String,
    pub ice_servers: Vec<IceServer>,
    pub outbound_queue_capacity: usize,
    pub max_message_bytes: usize,
    pub quality_history: usize,
    pub ping_interval_secs: u64,
    /// Origins allowed by CORS. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            ice_servers: default_ice_servers(),
            outbound_queue_capacity: DEFAULT_OUTBOUND_QUEUE,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            quality_history: DEFAULT_HISTORY,
            ping_interval_secs: DEFAULT_PING_INTERVAL_SECS,
            allowed_origins: Vec::new(),
        }
    }
}

impl RelaySettings {
    /// Load settings from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| SettingsError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply overrides, only updating fields that are set.
    pub fn merge(&mut self, overrides: &SettingsOverrides) {
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(ref bind) = overrides.bind_address {
            self.bind_address.clone_from(bind);
        }
        if let Some(capacity) = overrides.outbound_queue_capacity {
            self.outbound_queue_capacity = capacity;
        }
        if let Some(max) = overrides.max_message_bytes {
            self.max_message_bytes = max;
        }
        if let Some(history) = overrides.quality_history {
            self.quality_history = history;
        }
        if let Some(secs) = overrides.ping_interval_secs {
            self.ping_interval_secs = secs;
        }
        if !overrides.allowed_origins.is_empty() {
            self.allowed_origins.clone_from(&overrides.allowed_origins);
        }
    }
}

/// Values that take precedence over the settings file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub outbound_queue_capacity: Option<usize>,
    pub max_message_bytes: Option<usize>,
    pub quality_history: Option<usize>,
    pub ping_interval_secs: Option<u64>,
    pub allowed_origins: Vec<String>,
}

/// Settings loading or validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse settings file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Port should be 0 or >= 1024 (privileged ports require root), got {0}")]
    InvalidPort(u16),

    #[error("Bind address cannot be empty")]
    EmptyBindAddress,

    #[error("Outbound queue capacity must be between 1 and 65536, got {0}")]
    InvalidQueueCapacity(usize),

    #[error("Max message size must be between 1 KiB and 16 MiB, got {0}")]
    InvalidMessageSize(usize),

    #[error("Quality history must be between {TREND_MIN_SAMPLES} and 1000, got {0}")]
    InvalidQualityHistory(usize),

    #[error("Ping interval must be between 1 and 3600 seconds, got {0}")]
    InvalidPingInterval(u64),

    #[error("Invalid ICE server URL: {0}")]
    InvalidIceServer(String),
}

/// Validate settings values.
pub fn validate_settings(settings: &RelaySettings) -> Result<(), SettingsError> {
    if settings.port != 0 && settings.port < 1024 {
        return Err(SettingsError::InvalidPort(settings.port));
    }

    if settings.bind_address.trim().is_empty() {
        return Err(SettingsError::EmptyBindAddress);
    }

    if !(1..=65_536).contains(&settings.outbound_queue_capacity) {
        return Err(SettingsError::InvalidQueueCapacity(
            settings.outbound_queue_capacity,
        ));
    }

    if !(1024..=16 * 1024 * 1024).contains(&settings.max_message_bytes) {
        return Err(SettingsError::InvalidMessageSize(settings.max_message_bytes));
    }

    if !(TREND_MIN_SAMPLES..=1000).contains(&settings.quality_history) {
        return Err(SettingsError::InvalidQualityHistory(
            settings.quality_history,
        ));
    }

    if !(1..=3600).contains(&settings.ping_interval_secs) {
        return Err(SettingsError::InvalidPingInterval(
            settings.ping_interval_secs,
        ));
    }

    if let Some(bad) = settings
        .ice_servers
        .iter()
        .find(|server| !server.has_valid_scheme())
    {
        return Err(SettingsError::InvalidIceServer(bad.urls.clone()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = RelaySettings::default();
        assert_eq!(settings.port, 3001);
        assert_eq!(settings.bind_address, "0.0.0.0");
        assert_eq!(settings.outbound_queue_capacity, 256);
        assert_eq!(settings.max_message_bytes, 65_536);
        assert_eq!(settings.quality_history, 10);
        assert_eq!(settings.ice_servers.len(), 2);
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: RelaySettings =
            serde_json::from_str(r#"{"port": 4000, "allowedOrigins": ["http://localhost:5173"]}"#)
                .unwrap();
        assert_eq!(settings.port, 4000);
        assert_eq!(settings.allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(settings.ping_interval_secs, DEFAULT_PING_INTERVAL_SECS);
    }

    #[test]
    fn test_validate_port_too_low() {
        let settings = RelaySettings {
            port: 80,
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidPort(80))
        ));
    }

    #[test]
    fn test_validate_port_zero_allowed() {
        let settings = RelaySettings {
            port: 0,
            ..Default::default()
        };
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_validate_queue_capacity() {
        let settings = RelaySettings {
            outbound_queue_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidQueueCapacity(0))
        ));
    }

    #[test]
    fn test_validate_quality_history_below_trend_minimum() {
        let settings = RelaySettings {
            quality_history: 3,
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidQualityHistory(3))
        ));
    }

    #[test]
    fn test_validate_ice_scheme() {
        let settings = RelaySettings {
            ice_servers: vec![IceServer::stun("http://example.com")],
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidIceServer(_))
        ));
    }

    #[test]
    fn test_merge_overrides() {
        let mut settings = RelaySettings::default();
        settings.merge(&SettingsOverrides {
            port: Some(5000),
            quality_history: Some(30),
            allowed_origins: vec!["https://school.example".to_string()],
            ..Default::default()
        });
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.quality_history, 30);
        assert_eq!(settings.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(settings.allowed_origins, vec!["https://school.example"]);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"port": 4100, "qualityHistory": 20}}"#).unwrap();

        let settings = RelaySettings::from_json_file(file.path()).unwrap();
        assert_eq!(settings.port, 4100);
        assert_eq!(settings.quality_history, 20);
    }

    #[test]
    fn test_from_json_file_errors() {
        let missing = RelaySettings::from_json_file(Path::new("/nonexistent/classcast.json"));
        assert!(matches!(missing, Err(SettingsError::Read { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let bad = RelaySettings::from_json_file(file.path());
        assert!(matches!(bad, Err(SettingsError::Parse { .. })));
    }
}
