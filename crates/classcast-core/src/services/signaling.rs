//! Signaling service: turns client frames into registry operations.
//!
//! Transport adapters own the sockets. They register a sink per connection,
//! feed every inbound text frame to [`SignalingService::handle_frame`], send
//! back whatever reply it returns, and call `disconnect` when the socket ends.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{ClassId, ConnectionId, SlideState, UserId};
use crate::ports::{CoreError, PeerSink};
use crate::protocol::{BackendEventKind, ClientMessage, ProtocolError, ServerMessage};
use crate::quality::{NetworkMetrics, QualityAssessment, QualityTracker, UserQuality};
use crate::registry::{DeliveryReport, RelayError, RoomRegistry};
use crate::settings::RelaySettings;

/// Service handling signaling traffic for all connections.
pub struct SignalingService {
    registry: Arc<RoomRegistry>,
    quality: Mutex<QualityTracker>,
    max_message_bytes: usize,
}

impl SignalingService {
    pub fn new(registry: Arc<RoomRegistry>, settings: &RelaySettings) -> Self {
        Self {
            registry,
            quality: Mutex::new(QualityTracker::new(settings.quality_history)),
            max_message_bytes: settings.max_message_bytes,
        }
    }

    pub const fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    pub const fn max_message_bytes(&self) -> usize {
        self.max_message_bytes
    }

    pub async fn connect(&self, connection_id: ConnectionId, sink: Arc<dyn PeerSink>) {
        self.registry.register(connection_id, sink).await;
    }

    /// Leave the room, forget the connection and its user's quality history.
    ///
    /// Users whose sockets were swept by an earlier fan-out lose their
    /// history here too.
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let member = self.registry.member(connection_id).await;
        self.registry.unregister(connection_id).await;
        let mut departed = self.registry.take_swept_users().await;
        departed.extend(member.map(|m| m.user_id));

        let mut quality = self.quality.lock().await;
        for user_id in departed {
            quality.forget(user_id);
        }
    }

    /// Handle one raw text frame. Errors become `error` frames; the
    /// connection is never closed because of a bad frame.
    pub async fn handle_frame(
        &self,
        connection_id: ConnectionId,
        text: &str,
    ) -> Option<ServerMessage> {
        let result = if text.len() > self.max_message_bytes {
            Err(CoreError::from(ProtocolError::TooLarge {
                size: text.len(),
                max: self.max_message_bytes,
            }))
        } else {
            match ClientMessage::parse(text) {
                Ok(message) => self.handle(connection_id, message).await,
                Err(e) => Err(e.into()),
            }
        };

        match result {
            Ok(reply) => reply,
            Err(err) => {
                debug!(connection_id = %connection_id, error = %err, "Rejected client frame");
                Some(ServerMessage::error(err.code(), err.to_string()))
            }
        }
    }

    /// Handle one decoded client message and return the direct reply, if any.
    pub async fn handle(
        &self,
        connection_id: ConnectionId,
        message: ClientMessage,
    ) -> Result<Option<ServerMessage>, CoreError> {
        match message {
            ClientMessage::JoinClass {
                class_id,
                user_id,
                role,
                name,
            } => {
                let snapshot = self
                    .registry
                    .join(connection_id, class_id, user_id, role, name)
                    .await?;
                Ok(Some(ServerMessage::Joined {
                    class_id: snapshot.class_id,
                    connection_id: snapshot.connection_id,
                    participants: snapshot.participants,
                    stream: snapshot.stream,
                    ice_servers: snapshot.ice_servers,
                }))
            }
            ClientMessage::Ping => Ok(Some(ServerMessage::Pong)),
            message => self.handle_joined(connection_id, message).await,
        }
    }

    async fn handle_joined(
        &self,
        connection_id: ConnectionId,
        message: ClientMessage,
    ) -> Result<Option<ServerMessage>, CoreError> {
        let member = self
            .registry
            .member(connection_id)
            .await
            .ok_or(RelayError::NotJoined)?;
        let class_id = member.class_id;
        let from = member.user_id;

        match message {
            ClientMessage::LeaveClass => {
                self.registry.leave(connection_id).await;
            }
            ClientMessage::Offer { target, sdp } => {
                self.registry
                    .send_to_user(class_id, target, &ServerMessage::Offer { from, sdp })
                    .await?;
            }
            ClientMessage::Answer { target, sdp } => {
                self.registry
                    .send_to_user(class_id, target, &ServerMessage::Answer { from, sdp })
                    .await?;
            }
            ClientMessage::IceCandidate { target, candidate } => {
                self.registry
                    .send_to_user(
                        class_id,
                        target,
                        &ServerMessage::IceCandidate { from, candidate },
                    )
                    .await?;
            }
            ClientMessage::SlideChange { slide } => {
                if !member.role.is_teacher() {
                    return Err(RelayError::NotTeacher("change slides").into());
                }
                if let Some(state) = SlideState::from_payload(&slide) {
                    self.registry.record_slide(class_id, state).await;
                }
                self.registry
                    .broadcast(
                        class_id,
                        &ServerMessage::SlideChange { from, slide },
                        Some(connection_id),
                    )
                    .await;
            }
            ClientMessage::AudioControl { data } => {
                self.registry
                    .broadcast(
                        class_id,
                        &ServerMessage::AudioControl { from, data },
                        Some(connection_id),
                    )
                    .await;
            }
            ClientMessage::AudioChunk { data } => {
                self.registry
                    .broadcast(
                        class_id,
                        &ServerMessage::AudioChunk { from, data },
                        Some(connection_id),
                    )
                    .await;
            }
            ClientMessage::NetworkReport { metrics } => {
                let assessment = self.record_quality(from, metrics).await?;
                if assessment.changed() {
                    self.registry
                        .announce_profile(class_id, from, assessment.previous, assessment.profile)
                        .await;
                }
                let profile = assessment.profile.profile();
                return Ok(Some(ServerMessage::QualityProfile {
                    assessment,
                    profile,
                }));
            }
            ClientMessage::JoinClass { .. } | ClientMessage::Ping => {
                return Err(CoreError::Internal(format!(
                    "{} reached the joined-member path",
                    message.kind()
                )));
            }
        }
        Ok(None)
    }

    /// Record a report in the user's history.
    pub async fn record_quality(
        &self,
        user_id: UserId,
        metrics: NetworkMetrics,
    ) -> Result<QualityAssessment, CoreError> {
        Ok(self.quality.lock().await.record(user_id, metrics)?)
    }

    pub async fn user_quality(&self, user_id: UserId) -> Option<UserQuality> {
        self.quality.lock().await.snapshot(user_id)
    }

    /// Relay an application backend event to the room named in its data.
    ///
    /// `data` must carry `class_id` (or `classId`). A `slide-sync` payload
    /// that describes a slide also becomes the stream's current slide.
    pub async fn ingest_backend_event(
        &self,
        event: &str,
        data: Value,
    ) -> Result<(ClassId, DeliveryReport), CoreError> {
        let kind: BackendEventKind = serde_json::from_value(Value::String(event.to_string()))
            .map_err(|_| CoreError::Validation(format!("Unknown event: {event}")))?;
        let class_id = class_id_of(&data).ok_or_else(|| {
            CoreError::Validation("Event data must include class_id".to_string())
        })?;

        if kind == BackendEventKind::SlideSync {
            if let Some(slide) = SlideState::from_payload(&data) {
                self.registry.record_slide(class_id, slide).await;
            }
        }

        let report = self
            .registry
            .relay_backend_event(class_id, kind, data)
            .await;
        debug!(
            class_id = %class_id,
            event = %event,
            delivered = report.delivered,
            "Relayed backend event"
        );
        Ok((class_id, report))
    }
}

fn class_id_of(data: &Value) -> Option<ClassId> {
    data.get("class_id")
        .or_else(|| data.get("classId"))
        .and_then(Value::as_u64)
        .map(ClassId)
}
