//! Application services.
//!
//! Services orchestrate domain operations for the transport adapters.

mod signaling;

pub use signaling::SignalingService;
