//! CLI-specific error types and exit codes.

use classcast_core::{QualityError, SettingsError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid command-line input.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Settings file could not be read or parsed, or values are out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Output could not be written.
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map error to an exit code (see sysexits.h).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<QualityError> for CliError {
    fn from(err: QualityError) -> Self {
        Self::Arguments(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Io(err.to_string())
    }
}
