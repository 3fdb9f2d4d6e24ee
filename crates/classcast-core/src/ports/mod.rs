//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the core needs from adapters without
//! committing to a transport. Adapters in other crates implement them.
//!
//! # Design Rules
//!
//! - No transport types (`axum::*`, `tokio::sync::mpsc`) in trait signatures
//! - Implementations must not block: both ports are called under the
//!   registry lock

mod event_emitter;
mod peer_sink;

use thiserror::Error;

pub use event_emitter::{NoopEmitter, RelayEventEmitter};
pub use peer_sink::{Delivery, PeerSink, RecordingSink};

use crate::profiles::ProfileError;
use crate::protocol::{ErrorCode, ProtocolError};
use crate::quality::QualityError;
use crate::registry::RelayError;
use crate::settings::SettingsError;

/// Unified error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Room or stream operation failed.
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// Profile lookup failed.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Metrics were rejected.
    #[error(transparent)]
    Quality(#[from] QualityError),

    /// Settings validation error.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Frame could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Validation error (invalid input).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error (unexpected condition).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wire error code for `error` frames.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Relay(e) => e.code(),
            Self::Protocol(e) => e.code(),
            Self::Quality(_) => ErrorCode::InvalidMetrics,
            Self::Profile(_) | Self::Validation(_) => ErrorCode::BadMessage,
            Self::Settings(_) | Self::Internal(_) => ErrorCode::Internal,
        }
    }
}
