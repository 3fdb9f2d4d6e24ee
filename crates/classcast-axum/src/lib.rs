#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Dev-dependencies used only by the integration tests
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tokio_tungstenite as _;
#[cfg(test)]
use tower as _;

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sse;
pub mod state;
pub mod ws_peer;

// Re-export primary types
pub use bootstrap::{AxumContext, CorsConfig, ServerConfig, bootstrap, spawn_server, start_server};
pub use error::HttpError;
pub use routes::{create_router, create_router_with_state};
pub use sse::SseBroadcaster;
pub use state::AppState;
pub use ws_peer::ChannelPeerSink;
