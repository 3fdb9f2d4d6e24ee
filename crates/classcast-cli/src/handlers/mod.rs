//! Command handlers.
//!
//! Handlers are thin: they call into `classcast-core` or `classcast-axum`
//! and format the result for the terminal.

pub mod config;
pub mod profiles;
pub mod recommend;
pub mod serve;
