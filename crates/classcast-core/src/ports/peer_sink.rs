//! Outbound delivery port for connected peers.
//!
//! The registry never touches sockets. Each registered connection carries a
//! [`PeerSink`] supplied by the transport adapter; the registry hands it
//! messages and learns only whether they were queued.

use std::sync::{Arc, Mutex};

use crate::protocol::ServerMessage;

/// Outcome of handing one message to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued for the peer.
    Delivered,
    /// The peer's queue was full; the message was discarded.
    Dropped,
    /// The peer is gone; its connection should be forgotten.
    Closed,
}

/// Trait for delivering messages to one connected peer.
///
/// Implementations must not block: the registry calls `deliver` while it
/// holds its lock.
pub trait PeerSink: Send + Sync {
    fn deliver(&self, message: &ServerMessage) -> Delivery;
}

/// Sink that keeps every message in memory.
///
/// Used by tests and by callers that want to inspect what a peer would
/// have received.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<ServerMessage>>,
    outcome: Option<Delivery>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A sink that always reports `outcome` and records nothing.
    pub fn failing(outcome: Delivery) -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(Vec::new()),
            outcome: Some(outcome),
        })
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<ServerMessage> {
        self.messages
            .lock()
            .map(|mut messages| std::mem::take(&mut *messages))
            .unwrap_or_default()
    }

    /// Wire names of the recorded messages, without draining them.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.messages
            .lock()
            .map(|messages| messages.iter().map(ServerMessage::kind).collect())
            .unwrap_or_default()
    }
}

impl PeerSink for RecordingSink {
    fn deliver(&self, message: &ServerMessage) -> Delivery {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        match self.messages.lock() {
            Ok(mut messages) => {
                messages.push(message.clone());
                Delivery::Delivered
            }
            Err(_) => Delivery::Closed,
        }
    }
}
