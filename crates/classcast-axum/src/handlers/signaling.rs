//! WebSocket upgrade handler for the signaling plane.
//!
//! `GET /ws` upgrades the connection to a text WebSocket carrying JSON
//! signaling frames (`join-class`, `offer`, `answer`, `ice-candidate`, ...).
//!
//! ## Lifecycle
//!
//! 1. The handler allocates a [`ConnectionId`] and a [`ChannelPeerSink`] and
//!    registers both with the signaling service. The connection belongs to
//!    no room until it sends `join-class`.
//! 2. Spawns two tasks:
//!    * **Ingest** - reads browser text frames, hands each to
//!      [`SignalingService::handle_frame`] and queues the direct reply on the
//!      connection's own sink so it stays ordered with room traffic.
//!    * **Egress** - drains the sink channel into the socket and sends a
//!      WebSocket ping every `pingIntervalSecs`.
//! 3. `tokio::select!` waits for either task to finish (graceful close or
//!    network drop) and aborts the other.
//! 4. The connection is unregistered, which leaves its room.
//!
//! [`SignalingService::handle_frame`]: classcast_core::SignalingService::handle_frame

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use classcast_core::{ConnectionId, Delivery, ErrorCode, PeerSink, ServerMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::state::AppState;
use crate::ws_peer::ChannelPeerSink;

/// `GET /ws` - WebSocket upgrade endpoint for signaling.
pub async fn signaling_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_signaling_ws(socket, state))
}

async fn handle_signaling_ws(socket: WebSocket, state: AppState) {
    let connection_id = ConnectionId::new();
    let (sink, mut frame_rx) = ChannelPeerSink::new(state.settings.outbound_queue_capacity);
    let sink = Arc::new(sink);
    state
        .signaling
        .connect(connection_id, sink.clone() as Arc<dyn PeerSink>)
        .await;

    info!(connection_id = %connection_id, "Signaling socket opened");

    let (ws_sender, ws_receiver) = socket.split();

    // ── Ingest: browser frames → signaling service ──────────────────────

    let signaling = state.signaling.clone();
    let mut ingest = tokio::spawn(async move {
        let mut ws_receiver = ws_receiver;

        while let Some(msg_result) = ws_receiver.next().await {
            let reply = match msg_result {
                Ok(Message::Text(text)) => {
                    signaling.handle_frame(connection_id, text.as_str()).await
                }
                Ok(Message::Binary(data)) => {
                    debug!(connection_id = %connection_id, bytes = data.len(), "Binary frame rejected");
                    Some(ServerMessage::error(
                        ErrorCode::BadMessage,
                        "Binary frames are not supported",
                    ))
                }
                Ok(Message::Close(_)) | Err(_) => break,
                // Pongs are handled by the protocol layer
                Ok(_) => None,
            };

            if let Some(reply) = reply {
                if sink.deliver(&reply) == Delivery::Closed {
                    break;
                }
            }
        }
    });

    // ── Egress: sink channel → browser text frames, plus keep-alive pings ──

    let ping_every = Duration::from_secs(state.settings.ping_interval_secs);
    let mut egress = tokio::spawn(async move {
        let mut ws_sender = ws_sender;
        let mut ping = tokio::time::interval_at(tokio::time::Instant::now() + ping_every, ping_every);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                frame = frame_rx.recv() => {
                    let Some(text) = frame else { break };
                    if ws_sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick() => {
                    if ws_sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    tokio::select! {
        _ = &mut ingest => { egress.abort(); }
        _ = &mut egress => { ingest.abort(); }
    }

    state.signaling.disconnect(connection_id).await;

    info!(connection_id = %connection_id, "Signaling socket closed");
}
