//! SSE event broadcaster for relay lifecycle events.
//!
//! Implements the core [`RelayEventEmitter`] port. Events go out on a
//! broadcast channel and are streamed to every connected SSE client.

use std::convert::Infallible;
use std::sync::Arc;

use axum::response::sse::{Event, Sse};
use classcast_core::RelayEvent;
use classcast_core::ports::RelayEventEmitter;
use futures_util::stream::Stream;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

/// SSE broadcaster that implements the relay event emitter port.
///
/// Multiple clients can receive the same events simultaneously.
#[derive(Debug, Clone)]
pub struct SseBroadcaster {
    sender: broadcast::Sender<RelayEvent>,
}

impl SseBroadcaster {
    /// Create a broadcaster buffering up to `capacity` events.
    ///
    /// Slow clients may miss events if the buffer overflows.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new SSE broadcaster with default capacity (256 events).
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(256)
    }

    /// Create an SSE stream for a new client connection.
    ///
    /// Includes a keep-alive ping every 30 seconds to prevent proxy timeouts.
    pub fn subscribe(
        self: Arc<Self>,
    ) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
        let receiver = self.sender.subscribe();
        let stream = BroadcastStream::new(receiver).filter_map(|result| match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().data(json))),
                Err(e) => {
                    tracing::warn!("Failed to serialize relay event: {}", e);
                    None
                }
            },
            Err(e) => {
                // Lagged receivers skip ahead
                tracing::debug!("SSE stream error: {}", e);
                None
            }
        });

        Sse::new(stream).keep_alive(
            axum::response::sse::KeepAlive::new()
                .interval(std::time::Duration::from_secs(30))
                .text("ping"),
        )
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[cfg(test)]
    fn receiver(&self) -> broadcast::Receiver<RelayEvent> {
        self.sender.subscribe()
    }
}

impl RelayEventEmitter for SseBroadcaster {
    fn emit(&self, event: RelayEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    fn clone_box(&self) -> Box<dyn RelayEventEmitter> {
        Box::new(self.clone())
    }
}
