//! Core domain types.
//!
//! Identifiers, roles, slide references and ICE configuration. These are
//! pure data types with no infrastructure dependencies.

mod ice;
mod ids;
mod slide;

pub use ice::{DEFAULT_STUN_URLS, IceServer, default_ice_servers};
pub use ids::{ClassId, ConnectionId, Role, UserId};
pub use slide::{SlideAction, SlideState};
