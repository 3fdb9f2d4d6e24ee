//! Channel-backed peer sink for signaling sockets.
//!
//! [`ChannelPeerSink`] serializes each outbound [`ServerMessage`] once and
//! queues the text in a bounded `mpsc` channel that the socket's egress task
//! drains.
//!
//! ## Overflow policy
//!
//! When the queue is full the message is dropped rather than
//! back-pressuring the room: one slow browser must not stall a broadcast.
//! The registry logs the drop. When the egress task is gone the channel is
//! closed and the sink reports [`Delivery::Closed`], which makes the
//! registry forget the connection.

use classcast_core::ports::{Delivery, PeerSink};
use classcast_core::ServerMessage;
use tokio::sync::mpsc;
use tracing::warn;

/// Peer sink feeding a socket's egress task.
#[derive(Debug, Clone)]
pub struct ChannelPeerSink {
    frame_tx: mpsc::Sender<String>,
}

impl ChannelPeerSink {
    /// Create a sink and the receiver the egress task drains.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; settings validation rejects that.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (frame_tx, frame_rx) = mpsc::channel(capacity);
        (Self { frame_tx }, frame_rx)
    }
}

impl PeerSink for ChannelPeerSink {
    fn deliver(&self, message: &ServerMessage) -> Delivery {
        let text = match message.to_json() {
            Ok(text) => text,
            Err(e) => {
                warn!(message = message.kind(), error = %e, "Failed to serialize outbound message");
                return Delivery::Dropped;
            }
        };
        match self.frame_tx.try_send(text) {
            Ok(()) => Delivery::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => Delivery::Dropped,
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}
