//! Signaling wire protocol.
//!
//! # Wire Format
//!
//! Every frame is a JSON text message tagged with a kebab-case `type`;
//! payload fields are camelCase:
//!
//! ```json
//! { "type": "ice-candidate", "target": 12, "candidate": { "candidate": "…" } }
//! ```
//!
//! Signal payloads (SDP, ICE candidates, slide and audio blobs) are opaque
//! to the relay.

mod client;
mod server;

use thiserror::Error;

pub use client::ClientMessage;
pub use server::{BackendEventKind, ErrorCode, ServerMessage};

/// Frame decoding error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error("Message too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}

impl ProtocolError {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Malformed(_) => ErrorCode::BadMessage,
            Self::TooLarge { .. } => ErrorCode::MessageTooLarge,
        }
    }
}
