//! Event emitter trait for relay lifecycle events.
//!
//! Implementations handle transport details (broadcast channels, SSE, logs).

use crate::events::RelayEvent;

/// Trait for emitting relay events.
///
/// # Implementations
///
/// - `NoopEmitter` - For tests and CLI contexts that don't need events
/// - Adapter-specific implementations (Axum SSE)
pub trait RelayEventEmitter: Send + Sync {
    /// Emit a relay event. Must not block.
    fn emit(&self, event: RelayEvent);

    /// Clone this emitter into a boxed trait object.
    fn clone_box(&self) -> Box<dyn RelayEventEmitter>;
}

/// A no-op event emitter.
#[derive(Debug, Clone, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    pub const fn new() -> Self {
        Self
    }
}

impl RelayEventEmitter for NoopEmitter {
    fn emit(&self, _event: RelayEvent) {}

    fn clone_box(&self) -> Box<dyn RelayEventEmitter> {
        Box::new(self.clone())
    }
}
