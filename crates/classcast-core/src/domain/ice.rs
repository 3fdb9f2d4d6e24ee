//! ICE server configuration handed to WebRTC peers.

use serde::{Deserialize, Serialize};

/// Public STUN servers used when no ICE servers are configured.
pub const DEFAULT_STUN_URLS: [&str; 2] = [
    "stun:stun.l.google.com:19302",
    "stun:stun1.l.google.com:19302",
];

/// One entry of an `RTCConfiguration.iceServers` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceServer {
    pub urls: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServer {
    /// A credential-less STUN entry.
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: url.into(),
            username: None,
            credential: None,
        }
    }

    /// A TURN entry with credentials.
    pub fn turn(
        url: impl Into<String>,
        username: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            urls: url.into(),
            username: Some(username.into()),
            credential: Some(credential.into()),
        }
    }

    /// Whether the URL uses a scheme WebRTC understands.
    pub fn has_valid_scheme(&self) -> bool {
        ["stun:", "stuns:", "turn:", "turns:"]
            .iter()
            .any(|scheme| self.urls.starts_with(scheme))
    }
}

/// The fallback ICE server list.
pub fn default_ice_servers() -> Vec<IceServer> {
    DEFAULT_STUN_URLS.iter().map(|url| IceServer::stun(*url)).collect()
}
