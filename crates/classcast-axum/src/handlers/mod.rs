//! HTTP request handlers for the Axum web server.
//!
//! Each submodule contains handlers for a specific API area.
//! Handlers are thin wrappers that delegate to the room registry and the
//! signaling service.

pub mod config;
pub mod events;
pub mod profiles;
pub mod quality;
pub mod rooms;
pub mod signaling;
pub mod streams;
