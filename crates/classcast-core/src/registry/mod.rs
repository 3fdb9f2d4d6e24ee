//! Room and connection registry.
//!
//! Tracks every accepted connection, which class room it sits in, and the
//! live stream of each room. All state sits behind one `RwLock`; every
//! mutation, including the fan-out to peer sinks, happens under the write
//! lock so membership and delivery stay consistent.
//!
//! Delivery is best effort. A sink reporting [`Delivery::Closed`] has its
//! connection removed on the spot, and the rest of its room is told.

mod session;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub use session::{
    JoinSnapshot, Participant, ParticipantInfo, RoomSummary, StartedStream, StreamDetails,
    StreamJoin, StreamSession, StreamStatus,
};

use crate::domain::{ClassId, ConnectionId, IceServer, Role, SlideState, UserId};
use crate::events::RelayEvent;
use crate::ports::{Delivery, PeerSink, RelayEventEmitter};
use crate::profiles::ProfileName;
use crate::protocol::{BackendEventKind, ErrorCode, ServerMessage};

/// Errors from room and stream operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Connection {0} is not registered")]
    UnknownConnection(ConnectionId),

    #[error("Join a class first")]
    NotJoined,

    #[error("Only teachers can {0}")]
    NotTeacher(&'static str),

    #[error("A stream is already active in class {0}")]
    StreamAlreadyActive(ClassId),

    #[error("No active stream in class {0}")]
    NoActiveStream(ClassId),

    #[error("User {user_id} does not own the stream in class {class_id}")]
    NotStreamOwner { class_id: ClassId, user_id: UserId },

    #[error("User {user_id} is not in class {class_id}")]
    TargetNotFound { class_id: ClassId, user_id: UserId },

    #[error("Class {0} has no room")]
    RoomNotFound(ClassId),

    #[error("Internal relay error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Wire error code for `error` frames.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotJoined => ErrorCode::NotJoined,
            Self::NotTeacher(_) | Self::NotStreamOwner { .. } => ErrorCode::Forbidden,
            Self::StreamAlreadyActive(_) => ErrorCode::Conflict,
            Self::NoActiveStream(_) => ErrorCode::NoActiveStream,
            Self::TargetNotFound { .. } | Self::RoomNotFound(_) => ErrorCode::TargetNotFound,
            Self::UnknownConnection(_) | Self::Internal(_) => ErrorCode::Internal,
        }
    }
}

/// Per-message delivery counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    pub delivered: usize,
    pub dropped: usize,
    pub closed: usize,
}

impl DeliveryReport {
    pub const fn attempted(&self) -> usize {
        self.delivered + self.dropped + self.closed
    }
}

/// Who a connection is, once it has joined a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub connection_id: ConnectionId,
    pub class_id: ClassId,
    pub user_id: UserId,
    pub role: Role,
}

#[derive(Debug, Clone)]
struct Seat {
    class_id: ClassId,
    user_id: UserId,
    role: Role,
    name: Option<String>,
    joined_at: DateTime<Utc>,
}

struct Member {
    sink: Arc<dyn PeerSink>,
    /// `None` until the connection joins a class.
    seat: Option<Seat>,
}

#[derive(Default)]
struct Room {
    /// Connections in join order.
    members: Vec<ConnectionId>,
    stream: Option<StreamSession>,
}

#[derive(Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, Member>,
    rooms: HashMap<ClassId, Room>,
    /// Users whose seated connection was swept after its sink closed.
    swept: Vec<UserId>,
}

impl RegistryState {
    fn seat(&self, connection_id: ConnectionId) -> Option<&Seat> {
        self.connections
            .get(&connection_id)
            .and_then(|member| member.seat.as_ref())
    }

    fn is_seated(&self, user_id: UserId) -> bool {
        self.connections
            .values()
            .any(|member| member.seat.as_ref().is_some_and(|seat| seat.user_id == user_id))
    }

    fn room_targets(&self, class_id: ClassId, exclude: Option<ConnectionId>) -> Vec<ConnectionId> {
        self.rooms
            .get(&class_id)
            .map(|room| {
                room.members
                    .iter()
                    .copied()
                    .filter(|id| Some(*id) != exclude)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn participants(&self, class_id: ClassId) -> Vec<ParticipantInfo> {
        let Some(room) = self.rooms.get(&class_id) else {
            return Vec::new();
        };
        room.members
            .iter()
            .filter_map(|id| {
                self.seat(*id).map(|seat| ParticipantInfo {
                    connection_id: *id,
                    user_id: seat.user_id,
                    role: seat.role,
                    name: seat.name.clone(),
                    joined_at: seat.joined_at,
                })
            })
            .collect()
    }

    fn stream_status(&self, class_id: ClassId) -> StreamStatus {
        StreamStatus::of(self.rooms.get(&class_id).and_then(|room| room.stream.as_ref()))
    }

    fn summary(&self, class_id: ClassId) -> Option<RoomSummary> {
        let room = self.rooms.get(&class_id)?;
        Some(RoomSummary {
            class_id,
            member_count: room.members.len(),
            members: self.participants(class_id),
            stream: self.stream_status(class_id),
        })
    }

    fn stream_mut(&mut self, class_id: ClassId) -> Result<&mut StreamSession, RelayError> {
        self.rooms
            .get_mut(&class_id)
            .and_then(|room| room.stream.as_mut())
            .ok_or(RelayError::NoActiveStream(class_id))
    }

    fn ensure_room(&mut self, class_id: ClassId, events: &dyn RelayEventEmitter) -> &mut Room {
        if !self.rooms.contains_key(&class_id) {
            info!(class_id = %class_id, "Room opened");
            events.emit(RelayEvent::RoomOpened { class_id });
        }
        self.rooms.entry(class_id).or_default()
    }

    /// Delete the room if nobody is in it and no stream keeps it alive.
    fn close_room_if_idle(&mut self, class_id: ClassId, events: &dyn RelayEventEmitter) -> bool {
        let idle = self
            .rooms
            .get(&class_id)
            .is_some_and(|room| room.members.is_empty() && room.stream.is_none());
        if idle {
            self.rooms.remove(&class_id);
            info!(class_id = %class_id, "Room closed");
            events.emit(RelayEvent::RoomClosed { class_id });
        }
        idle
    }

    /// Hand `message` to each target, then forget connections whose sink closed.
    fn deliver(
        &mut self,
        targets: &[ConnectionId],
        message: &ServerMessage,
        events: &dyn RelayEventEmitter,
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let mut closed = Vec::new();

        for id in targets {
            let Some(member) = self.connections.get(id) else {
                continue;
            };
            match member.sink.deliver(message) {
                Delivery::Delivered => report.delivered += 1,
                Delivery::Dropped => {
                    report.dropped += 1;
                    warn!(
                        connection_id = %id,
                        message = message.kind(),
                        "Outbound queue full, dropping message"
                    );
                }
                Delivery::Closed => {
                    report.closed += 1;
                    closed.push(*id);
                }
            }
        }

        self.purge(closed, events);
        report
    }

    /// Remove closed connections. Telling their rooms may surface more
    /// closed sinks, which join the work list.
    fn purge(&mut self, mut closed: Vec<ConnectionId>, events: &dyn RelayEventEmitter) {
        while let Some(id) = closed.pop() {
            let Some(member) = self.connections.remove(&id) else {
                continue;
            };
            debug!(connection_id = %id, "Removing closed connection");

            let Some(seat) = member.seat else {
                continue;
            };
            self.swept.push(seat.user_id);
            let remaining = self.detach(id, &seat, events);
            let notice = ServerMessage::UserLeft {
                user_id: seat.user_id,
            };
            for other in remaining {
                let Some(peer) = self.connections.get(&other) else {
                    continue;
                };
                match peer.sink.deliver(&notice) {
                    Delivery::Delivered => {}
                    Delivery::Dropped => {
                        warn!(
                            connection_id = %other,
                            message = notice.kind(),
                            "Outbound queue full, dropping message"
                        );
                    }
                    Delivery::Closed => closed.push(other),
                }
            }
        }
    }

    /// Take a connection out of its room's member list. Returns who is left.
    fn detach(
        &mut self,
        connection_id: ConnectionId,
        seat: &Seat,
        events: &dyn RelayEventEmitter,
    ) -> Vec<ConnectionId> {
        let class_id = seat.class_id;
        let remaining = match self.rooms.get_mut(&class_id) {
            Some(room) => {
                room.members.retain(|id| *id != connection_id);
                room.members.clone()
            }
            None => Vec::new(),
        };

        info!(
            class_id = %class_id,
            user_id = %seat.user_id,
            connection_id = %connection_id,
            "Member left class"
        );
        events.emit(RelayEvent::MemberLeft {
            class_id,
            user_id: seat.user_id,
        });
        self.close_room_if_idle(class_id, events);
        remaining
    }

    fn leave_room(
        &mut self,
        connection_id: ConnectionId,
        events: &dyn RelayEventEmitter,
    ) -> Option<ClassId> {
        let seat = self.connections.get_mut(&connection_id)?.seat.take()?;
        let remaining = self.detach(connection_id, &seat, events);
        self.deliver(
            &remaining,
            &ServerMessage::UserLeft {
                user_id: seat.user_id,
            },
            events,
        );
        Some(seat.class_id)
    }

    fn join(
        &mut self,
        connection_id: ConnectionId,
        seat: Seat,
        events: &dyn RelayEventEmitter,
    ) -> Result<(), RelayError> {
        if !self.connections.contains_key(&connection_id) {
            return Err(RelayError::UnknownConnection(connection_id));
        }
        self.leave_room(connection_id, events);

        let class_id = seat.class_id;
        let user_id = seat.user_id;

        // Newest connection wins: older sockets of the same user lose their seat.
        let replaced: Vec<ConnectionId> = self
            .room_targets(class_id, None)
            .into_iter()
            .filter(|id| self.seat(*id).is_some_and(|s| s.user_id == user_id))
            .collect();
        for old in &replaced {
            if let Some(member) = self.connections.get_mut(old) {
                member.seat = None;
            }
            if let Some(room) = self.rooms.get_mut(&class_id) {
                room.members.retain(|id| id != old);
            }
            info!(
                class_id = %class_id,
                user_id = %user_id,
                connection_id = %old,
                "Connection replaced by a newer one"
            );
        }
        self.deliver(&replaced, &ServerMessage::Replaced, events);

        let joined = ServerMessage::UserJoined {
            user_id,
            role: seat.role,
            name: seat.name.clone(),
        };
        let role = seat.role;

        self.ensure_room(class_id, events).members.push(connection_id);
        if let Some(member) = self.connections.get_mut(&connection_id) {
            member.seat = Some(seat);
        }

        info!(
            class_id = %class_id,
            user_id = %user_id,
            role = %role,
            connection_id = %connection_id,
            "Member joined class"
        );
        events.emit(RelayEvent::MemberJoined {
            class_id,
            user_id,
            role,
        });

        let others = self.room_targets(class_id, Some(connection_id));
        self.deliver(&others, &joined, events);
        Ok(())
    }
}

/// Registry of connections, rooms and live streams.
pub struct RoomRegistry {
    state: RwLock<RegistryState>,
    events: Arc<dyn RelayEventEmitter>,
    ice_servers: Vec<IceServer>,
}

impl RoomRegistry {
    pub fn new(events: Arc<dyn RelayEventEmitter>, ice_servers: Vec<IceServer>) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            events,
            ice_servers,
        }
    }

    pub fn ice_servers(&self) -> &[IceServer] {
        &self.ice_servers
    }

    /// Track an accepted connection. It is in no room yet.
    pub async fn register(&self, connection_id: ConnectionId, sink: Arc<dyn PeerSink>) {
        let mut state = self.state.write().await;
        state
            .connections
            .insert(connection_id, Member { sink, seat: None });
        debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Place a connection in a class room, leaving any previous room first.
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        class_id: ClassId,
        user_id: UserId,
        role: Role,
        name: Option<String>,
    ) -> Result<JoinSnapshot, RelayError> {
        let mut state = self.state.write().await;
        let seat = Seat {
            class_id,
            user_id,
            role,
            name,
            joined_at: Utc::now(),
        };
        state.join(connection_id, seat, self.events.as_ref())?;

        Ok(JoinSnapshot {
            class_id,
            connection_id,
            participants: state.participants(class_id),
            stream: state.stream_status(class_id),
            ice_servers: self.ice_servers.clone(),
        })
    }

    /// Leave the current room. Returns the class left, if any.
    pub async fn leave(&self, connection_id: ConnectionId) -> Option<ClassId> {
        let mut state = self.state.write().await;
        state.leave_room(connection_id, self.events.as_ref())
    }

    /// Leave the current room and forget the connection.
    pub async fn unregister(&self, connection_id: ConnectionId) -> bool {
        let mut state = self.state.write().await;
        state.leave_room(connection_id, self.events.as_ref());
        let removed = state.connections.remove(&connection_id).is_some();
        if removed {
            debug!(connection_id = %connection_id, "Connection unregistered");
        }
        removed
    }

    /// Drain the users removed by the closed-sink sweep who hold no other
    /// seat. Owners of per-user state use this to drop it.
    pub async fn take_swept_users(&self) -> Vec<UserId> {
        let mut state = self.state.write().await;
        let mut swept = std::mem::take(&mut state.swept);
        swept.sort_unstable();
        swept.dedup();
        swept.retain(|user_id| !state.is_seated(*user_id));
        swept
    }

    /// Seat of a connection, if it has joined a class.
    pub async fn member(&self, connection_id: ConnectionId) -> Option<MemberInfo> {
        let state = self.state.read().await;
        state.seat(connection_id).map(|seat| MemberInfo {
            connection_id,
            class_id: seat.class_id,
            user_id: seat.user_id,
            role: seat.role,
        })
    }

    /// Deliver to every member of a room except `exclude`.
    pub async fn broadcast(
        &self,
        class_id: ClassId,
        message: &ServerMessage,
        exclude: Option<ConnectionId>,
    ) -> DeliveryReport {
        let mut state = self.state.write().await;
        let targets = state.room_targets(class_id, exclude);
        let report = state.deliver(&targets, message, self.events.as_ref());
        debug!(
            class_id = %class_id,
            message = message.kind(),
            delivered = report.delivered,
            "Broadcast to room"
        );
        report
    }

    /// Deliver to every connection `user_id` holds in the room.
    pub async fn send_to_user(
        &self,
        class_id: ClassId,
        user_id: UserId,
        message: &ServerMessage,
    ) -> Result<DeliveryReport, RelayError> {
        let mut state = self.state.write().await;
        let targets: Vec<ConnectionId> = state
            .room_targets(class_id, None)
            .into_iter()
            .filter(|id| state.seat(*id).is_some_and(|seat| seat.user_id == user_id))
            .collect();
        if targets.is_empty() {
            return Err(RelayError::TargetNotFound { class_id, user_id });
        }
        Ok(state.deliver(&targets, message, self.events.as_ref()))
    }

    pub async fn room_summary(&self, class_id: ClassId) -> Option<RoomSummary> {
        self.state.read().await.summary(class_id)
    }

    /// Summaries of every room, ordered by class.
    pub async fn rooms(&self) -> Vec<RoomSummary> {
        let state = self.state.read().await;
        let mut class_ids: Vec<ClassId> = state.rooms.keys().copied().collect();
        class_ids.sort_unstable();
        class_ids
            .into_iter()
            .filter_map(|class_id| state.summary(class_id))
            .collect()
    }

    pub async fn connection_count(&self) -> usize {
        self.state.read().await.connections.len()
    }

    pub async fn room_count(&self) -> usize {
        self.state.read().await.rooms.len()
    }

    // ---- live streams ----

    pub async fn start_stream(
        &self,
        class_id: ClassId,
        teacher_id: UserId,
        role: Role,
    ) -> Result<StartedStream, RelayError> {
        if !role.is_teacher() {
            return Err(RelayError::NotTeacher("start streams"));
        }

        let mut state = self.state.write().await;
        let events = self.events.as_ref();
        let room = state.ensure_room(class_id, events);
        if room.stream.is_some() {
            return Err(RelayError::StreamAlreadyActive(class_id));
        }
        let session = StreamSession::new(class_id, teacher_id);
        let started = StartedStream {
            class_id,
            teacher_id,
            stream_id: session.stream_id(),
            started_at: session.started_at,
        };
        room.stream = Some(session);

        info!(class_id = %class_id, teacher_id = %teacher_id, "Stream started");
        events.emit(RelayEvent::StreamStarted {
            class_id,
            teacher_id,
        });

        let targets = state.room_targets(class_id, None);
        state.deliver(
            &targets,
            &ServerMessage::StreamStarted {
                class_id,
                teacher_id,
                stream_id: started.stream_id.clone(),
                started_at: started.started_at,
            },
            events,
        );
        Ok(started)
    }

    pub async fn stop_stream(
        &self,
        class_id: ClassId,
        teacher_id: UserId,
    ) -> Result<DeliveryReport, RelayError> {
        let mut state = self.state.write().await;
        let events = self.events.as_ref();
        state.stream_mut(class_id)?.ensure_owner(teacher_id)?;
        if let Some(room) = state.rooms.get_mut(&class_id) {
            room.stream = None;
        }

        info!(class_id = %class_id, teacher_id = %teacher_id, "Stream stopped");
        events.emit(RelayEvent::StreamStopped {
            class_id,
            teacher_id,
        });

        let targets = state.room_targets(class_id, None);
        let report = state.deliver(
            &targets,
            &ServerMessage::StreamStopped {
                class_id,
                teacher_id,
            },
            events,
        );
        state.close_room_if_idle(class_id, events);
        Ok(report)
    }

    /// Join the active stream. New participants start on the `fair` profile.
    pub async fn join_stream(
        &self,
        class_id: ClassId,
        user_id: UserId,
        role: Role,
    ) -> Result<StreamJoin, RelayError> {
        let mut state = self.state.write().await;
        let session = state.stream_mut(class_id)?;
        session.add_participant(user_id, role);
        let details = session.details();

        debug!(class_id = %class_id, user_id = %user_id, "User joined stream");
        let targets = state.room_targets(class_id, None);
        state.deliver(
            &targets,
            &ServerMessage::UserJoinedStream {
                class_id,
                user_id,
                role,
            },
            self.events.as_ref(),
        );

        Ok(StreamJoin {
            stream: details,
            ice_servers: self.ice_servers.clone(),
        })
    }

    /// Leave the stream. Succeeds when there is nothing to leave.
    pub async fn leave_stream(&self, class_id: ClassId, user_id: UserId) -> bool {
        let mut state = self.state.write().await;
        let removed = state
            .stream_mut(class_id)
            .ok()
            .and_then(|session| session.remove_participant(user_id))
            .is_some();
        if removed {
            debug!(class_id = %class_id, user_id = %user_id, "User left stream");
            let targets = state.room_targets(class_id, None);
            state.deliver(
                &targets,
                &ServerMessage::UserLeftStream { class_id, user_id },
                self.events.as_ref(),
            );
        }
        removed
    }

    /// Set the stream's current slide and show it to the room.
    pub async fn sync_slide(
        &self,
        class_id: ClassId,
        teacher_id: UserId,
        slide: SlideState,
    ) -> Result<DeliveryReport, RelayError> {
        let payload = serde_json::to_value(&slide).map_err(|e| RelayError::Internal(e.to_string()))?;

        let mut state = self.state.write().await;
        let session = state.stream_mut(class_id)?;
        session.ensure_owner(teacher_id)?;
        session.current_slide = Some(slide);

        let targets = state.room_targets(class_id, None);
        Ok(state.deliver(
            &targets,
            &ServerMessage::SlideChange {
                from: teacher_id,
                slide: payload,
            },
            self.events.as_ref(),
        ))
    }

    /// Store a slide on the active stream, if there is one.
    pub async fn record_slide(&self, class_id: ClassId, slide: SlideState) -> bool {
        let mut state = self.state.write().await;
        match state.stream_mut(class_id) {
            Ok(session) => {
                session.current_slide = Some(slide);
                true
            }
            Err(_) => false,
        }
    }

    /// Record a participant's profile and tell the room.
    pub async fn update_bandwidth_profile(
        &self,
        class_id: ClassId,
        user_id: UserId,
        profile: ProfileName,
    ) -> Result<DeliveryReport, RelayError> {
        let mut state = self.state.write().await;
        let session = state.stream_mut(class_id)?;
        let from = session
            .participants
            .get(&user_id)
            .map(|participant| participant.bandwidth_profile)
            .ok_or(RelayError::TargetNotFound { class_id, user_id })?;
        session.set_bandwidth_profile(user_id, profile);

        self.events.emit(RelayEvent::ProfileChanged {
            user_id,
            class_id: Some(class_id),
            from: Some(from),
            to: profile,
        });
        let targets = state.room_targets(class_id, None);
        Ok(state.deliver(
            &targets,
            &ServerMessage::BandwidthUpdate { user_id, profile },
            self.events.as_ref(),
        ))
    }

    /// Announce a profile change measured from network reports.
    ///
    /// Updates the user's stream participant entry when a stream is active.
    pub async fn announce_profile(
        &self,
        class_id: ClassId,
        user_id: UserId,
        from: Option<ProfileName>,
        to: ProfileName,
    ) -> DeliveryReport {
        let mut state = self.state.write().await;
        if let Ok(session) = state.stream_mut(class_id) {
            session.set_bandwidth_profile(user_id, to);
        }
        self.events.emit(RelayEvent::ProfileChanged {
            user_id,
            class_id: Some(class_id),
            from,
            to,
        });
        let targets = state.room_targets(class_id, None);
        state.deliver(
            &targets,
            &ServerMessage::BandwidthUpdate {
                user_id,
                profile: to,
            },
            self.events.as_ref(),
        )
    }

    pub async fn set_audio_enabled(
        &self,
        class_id: ClassId,
        teacher_id: UserId,
        enabled: bool,
    ) -> Result<DeliveryReport, RelayError> {
        let mut state = self.state.write().await;
        let session = state.stream_mut(class_id)?;
        session.ensure_owner(teacher_id)?;
        session.set_audio_enabled(enabled);

        let targets = state.room_targets(class_id, None);
        Ok(state.deliver(
            &targets,
            &ServerMessage::AudioControl {
                from: teacher_id,
                data: json!({ "enabled": enabled }),
            },
            self.events.as_ref(),
        ))
    }

    pub async fn stream_status(&self, class_id: ClassId) -> StreamStatus {
        self.state.read().await.stream_status(class_id)
    }

    /// Forward an application backend event to a room.
    pub async fn relay_backend_event(
        &self,
        class_id: ClassId,
        event: BackendEventKind,
        data: Value,
    ) -> DeliveryReport {
        self.broadcast(class_id, &ServerMessage::Notification { event, data }, None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SlideAction, default_ice_servers};
    use crate::ports::{NoopEmitter, RecordingSink};
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct CollectingEmitter(Arc<Mutex<Vec<RelayEvent>>>);

    impl CollectingEmitter {
        fn events(&self) -> Vec<RelayEvent> {
            self.0.lock().unwrap().clone()
        }
    }

    impl RelayEventEmitter for CollectingEmitter {
        fn emit(&self, event: RelayEvent) {
            self.0.lock().unwrap().push(event);
        }

        fn clone_box(&self) -> Box<dyn RelayEventEmitter> {
            Box::new(self.clone())
        }
    }

    fn registry() -> RoomRegistry {
        RoomRegistry::new(Arc::new(NoopEmitter::new()), default_ice_servers())
    }

    async fn connect(registry: &RoomRegistry) -> (ConnectionId, Arc<RecordingSink>) {
        let id = ConnectionId::new();
        let sink = RecordingSink::new();
        registry.register(id, sink.clone()).await;
        (id, sink)
    }

    async fn seat(
        registry: &RoomRegistry,
        class: u64,
        user: u64,
        role: Role,
    ) -> (ConnectionId, Arc<RecordingSink>) {
        let (id, sink) = connect(registry).await;
        registry
            .join(id, ClassId(class), UserId(user), role, None)
            .await
            .unwrap();
        (id, sink)
    }

    #[tokio::test]
    async fn test_join_creates_room_and_notifies_others() {
        let registry = registry();
        let (_teacher, teacher_sink) = seat(&registry, 1, 10, Role::Teacher).await;
        let (student, _) = connect(&registry).await;

        let snapshot = registry
            .join(student, ClassId(1), UserId(20), Role::Student, Some("Ana".into()))
            .await
            .unwrap();

        assert_eq!(snapshot.participants.len(), 2);
        assert_eq!(snapshot.participants[0].user_id, UserId(10));
        assert!(!snapshot.stream.active);
        assert_eq!(snapshot.ice_servers.len(), 2);
        assert_eq!(teacher_sink.kinds(), vec!["user-joined"]);
        assert_eq!(registry.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_join_unknown_connection() {
        let registry = registry();
        let result = registry
            .join(ConnectionId::new(), ClassId(1), UserId(1), Role::Student, None)
            .await;
        assert!(matches!(result, Err(RelayError::UnknownConnection(_))));
        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_join_moves_between_rooms() {
        let registry = registry();
        let (_a, a_sink) = seat(&registry, 1, 1, Role::Teacher).await;
        let (mover, _) = seat(&registry, 1, 2, Role::Student).await;
        a_sink.take();

        registry
            .join(mover, ClassId(2), UserId(2), Role::Student, None)
            .await
            .unwrap();

        assert_eq!(a_sink.kinds(), vec!["user-left"]);
        assert_eq!(registry.member(mover).await.unwrap().class_id, ClassId(2));
        assert_eq!(registry.room_summary(ClassId(1)).await.unwrap().member_count, 1);
        assert_eq!(registry.room_summary(ClassId(2)).await.unwrap().member_count, 1);
    }

    #[tokio::test]
    async fn test_newest_connection_replaces_older() {
        let registry = registry();
        let (old, old_sink) = seat(&registry, 1, 7, Role::Student).await;
        let (new, _) = seat(&registry, 1, 7, Role::Student).await;

        assert_eq!(old_sink.kinds(), vec!["replaced"]);
        assert!(registry.member(old).await.is_none());
        assert!(registry.member(new).await.is_some());
        let summary = registry.room_summary(ClassId(1)).await.unwrap();
        assert_eq!(summary.member_count, 1);
        assert_eq!(summary.members[0].connection_id, new);
        // The replaced socket stays registered.
        assert_eq!(registry.connection_count().await, 2);
    }

    #[tokio::test]
    async fn test_leave_deletes_empty_room() {
        let registry = registry();
        let (id, _) = seat(&registry, 3, 1, Role::Student).await;

        assert_eq!(registry.leave(id).await, Some(ClassId(3)));
        assert!(registry.room_summary(ClassId(3)).await.is_none());
        assert_eq!(registry.leave(id).await, None);
    }

    #[tokio::test]
    async fn test_room_with_stream_survives_empty() {
        let registry = registry();
        let (teacher, _) = seat(&registry, 4, 1, Role::Teacher).await;
        registry
            .start_stream(ClassId(4), UserId(1), Role::Teacher)
            .await
            .unwrap();

        assert!(registry.unregister(teacher).await);
        assert!(registry.room_summary(ClassId(4)).await.is_some());

        registry.stop_stream(ClassId(4), UserId(1)).await.unwrap();
        assert!(registry.room_summary(ClassId(4)).await.is_none());
    }

    #[tokio::test]
    async fn test_broadcast_excludes_sender() {
        let registry = registry();
        let (a, a_sink) = seat(&registry, 1, 1, Role::Teacher).await;
        let (_b, b_sink) = seat(&registry, 1, 2, Role::Student).await;
        a_sink.take();

        let report = registry
            .broadcast(ClassId(1), &ServerMessage::Pong, Some(a))
            .await;

        assert_eq!(report.delivered, 1);
        assert!(a_sink.kinds().is_empty());
        assert_eq!(b_sink.kinds(), vec!["pong"]);
    }

    #[tokio::test]
    async fn test_closed_sink_is_swept() {
        let registry = registry();
        let (_a, a_sink) = seat(&registry, 1, 1, Role::Teacher).await;

        let dead = ConnectionId::new();
        registry
            .register(dead, RecordingSink::failing(Delivery::Closed))
            .await;
        registry
            .join(dead, ClassId(1), UserId(2), Role::Student, None)
            .await
            .unwrap();
        a_sink.take();

        let report = registry.broadcast(ClassId(1), &ServerMessage::Pong, None).await;

        assert_eq!(report.closed, 1);
        assert_eq!(a_sink.kinds(), vec!["pong", "user-left"]);
        assert_eq!(registry.connection_count().await, 1);
        assert_eq!(registry.room_summary(ClassId(1)).await.unwrap().member_count, 1);

        assert_eq!(registry.take_swept_users().await, vec![UserId(2)]);
        assert!(registry.take_swept_users().await.is_empty());
    }

    #[tokio::test]
    async fn test_swept_user_still_seated_elsewhere_is_kept() {
        let registry = registry();
        let (_live, _) = seat(&registry, 2, 2, Role::Student).await;
        let (_a, _) = seat(&registry, 1, 1, Role::Teacher).await;

        let dead = ConnectionId::new();
        registry
            .register(dead, RecordingSink::failing(Delivery::Closed))
            .await;
        registry
            .join(dead, ClassId(1), UserId(2), Role::Student, None)
            .await
            .unwrap();

        registry.broadcast(ClassId(1), &ServerMessage::Pong, None).await;
        assert!(registry.take_swept_users().await.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_delivery_keeps_connection() {
        let registry = registry();
        let full = ConnectionId::new();
        registry
            .register(full, RecordingSink::failing(Delivery::Dropped))
            .await;
        registry
            .join(full, ClassId(1), UserId(2), Role::Student, None)
            .await
            .unwrap();

        let report = registry.broadcast(ClassId(1), &ServerMessage::Pong, None).await;
        assert_eq!(report.dropped, 1);
        assert!(registry.member(full).await.is_some());
    }

    #[tokio::test]
    async fn test_sweep_notice_to_full_queue_keeps_connection() {
        let registry = registry();
        let full = ConnectionId::new();
        registry
            .register(full, RecordingSink::failing(Delivery::Dropped))
            .await;
        registry
            .join(full, ClassId(1), UserId(1), Role::Teacher, None)
            .await
            .unwrap();

        let dead = ConnectionId::new();
        registry
            .register(dead, RecordingSink::failing(Delivery::Closed))
            .await;
        registry
            .join(dead, ClassId(1), UserId(2), Role::Student, None)
            .await
            .unwrap();

        let report = registry
            .broadcast(ClassId(1), &ServerMessage::Pong, Some(full))
            .await;
        assert_eq!(report.closed, 1);
        assert!(registry.member(full).await.is_some());
        assert_eq!(registry.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_send_to_user() {
        let registry = registry();
        let (_a, _) = seat(&registry, 1, 1, Role::Teacher).await;
        let (_b, b_sink) = seat(&registry, 1, 2, Role::Student).await;
        b_sink.take();

        let report = registry
            .send_to_user(ClassId(1), UserId(2), &ServerMessage::Pong)
            .await
            .unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(b_sink.kinds(), vec!["pong"]);

        let missing = registry
            .send_to_user(ClassId(1), UserId(99), &ServerMessage::Pong)
            .await;
        assert_eq!(
            missing,
            Err(RelayError::TargetNotFound {
                class_id: ClassId(1),
                user_id: UserId(99)
            })
        );
    }

    #[tokio::test]
    async fn test_start_stream_rules() {
        let registry = registry();
        let (_t, t_sink) = seat(&registry, 5, 1, Role::Teacher).await;
        t_sink.take();

        let denied = registry.start_stream(ClassId(5), UserId(2), Role::Student).await;
        assert!(matches!(denied, Err(RelayError::NotTeacher(_))));

        let started = registry
            .start_stream(ClassId(5), UserId(1), Role::Teacher)
            .await
            .unwrap();
        assert_eq!(started.stream_id, "stream_5_1");
        assert_eq!(t_sink.kinds(), vec!["stream-started"]);

        let again = registry.start_stream(ClassId(5), UserId(1), Role::Teacher).await;
        assert_eq!(again, Err(RelayError::StreamAlreadyActive(ClassId(5))));
    }

    #[tokio::test]
    async fn test_stop_stream_rules() {
        let registry = registry();
        assert_eq!(
            registry.stop_stream(ClassId(6), UserId(1)).await,
            Err(RelayError::NoActiveStream(ClassId(6)))
        );

        registry
            .start_stream(ClassId(6), UserId(1), Role::Teacher)
            .await
            .unwrap();
        assert!(matches!(
            registry.stop_stream(ClassId(6), UserId(2)).await,
            Err(RelayError::NotStreamOwner { .. })
        ));
        assert!(registry.stop_stream(ClassId(6), UserId(1)).await.is_ok());
        assert!(!registry.stream_status(ClassId(6)).await.active);
    }

    #[tokio::test]
    async fn test_join_and_leave_stream() {
        let registry = registry();
        let (_t, t_sink) = seat(&registry, 7, 1, Role::Teacher).await;
        registry
            .start_stream(ClassId(7), UserId(1), Role::Teacher)
            .await
            .unwrap();
        t_sink.take();

        let joined = registry
            .join_stream(ClassId(7), UserId(2), Role::Student)
            .await
            .unwrap();
        assert_eq!(joined.stream.participants_count, 2);
        assert_eq!(joined.ice_servers.len(), 2);
        let student = joined
            .stream
            .participants
            .iter()
            .find(|p| p.user_id == UserId(2))
            .unwrap();
        assert_eq!(student.bandwidth_profile, ProfileName::Fair);

        assert!(registry.leave_stream(ClassId(7), UserId(2)).await);
        assert!(!registry.leave_stream(ClassId(7), UserId(2)).await);
        assert!(!registry.leave_stream(ClassId(99), UserId(2)).await);
        assert_eq!(t_sink.kinds(), vec!["user-joined-stream", "user-left-stream"]);
    }

    #[tokio::test]
    async fn test_join_stream_without_stream() {
        let registry = registry();
        let result = registry.join_stream(ClassId(8), UserId(2), Role::Student).await;
        assert_eq!(result, Err(RelayError::NoActiveStream(ClassId(8))));
    }

    #[tokio::test]
    async fn test_sync_slide_owner_only() {
        let registry = registry();
        let (_s, s_sink) = seat(&registry, 9, 2, Role::Student).await;
        registry
            .start_stream(ClassId(9), UserId(1), Role::Teacher)
            .await
            .unwrap();
        s_sink.take();

        let slide = SlideState::new(42, SlideAction::Next);
        assert!(matches!(
            registry.sync_slide(ClassId(9), UserId(2), slide.clone()).await,
            Err(RelayError::NotStreamOwner { .. })
        ));

        registry
            .sync_slide(ClassId(9), UserId(1), slide)
            .await
            .unwrap();
        let status = registry.stream_status(ClassId(9)).await;
        assert_eq!(status.details.unwrap().current_slide.unwrap().slide_id, 42);

        let messages = s_sink.take();
        match &messages[0] {
            ServerMessage::SlideChange { from, slide } => {
                assert_eq!(*from, UserId(1));
                assert_eq!(slide["slideId"], 42);
                assert_eq!(slide["action"], "next");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_bandwidth_profile() {
        let registry = registry();
        registry
            .start_stream(ClassId(10), UserId(1), Role::Teacher)
            .await
            .unwrap();
        registry
            .join_stream(ClassId(10), UserId(2), Role::Student)
            .await
            .unwrap();

        registry
            .update_bandwidth_profile(ClassId(10), UserId(2), ProfileName::Poor)
            .await
            .unwrap();
        let details = registry.stream_status(ClassId(10)).await.details.unwrap();
        let student = details
            .participants
            .iter()
            .find(|p| p.user_id == UserId(2))
            .unwrap();
        assert_eq!(student.bandwidth_profile, ProfileName::Poor);

        assert!(matches!(
            registry
                .update_bandwidth_profile(ClassId(10), UserId(3), ProfileName::Poor)
                .await,
            Err(RelayError::TargetNotFound { .. })
        ));
        assert!(matches!(
            registry
                .update_bandwidth_profile(ClassId(11), UserId(2), ProfileName::Poor)
                .await,
            Err(RelayError::NoActiveStream(_))
        ));
    }

    #[tokio::test]
    async fn test_set_audio_enabled() {
        let registry = registry();
        let (_s, s_sink) = seat(&registry, 12, 2, Role::Student).await;
        registry
            .start_stream(ClassId(12), UserId(1), Role::Teacher)
            .await
            .unwrap();
        s_sink.take();

        assert!(registry
            .set_audio_enabled(ClassId(12), UserId(2), false)
            .await
            .is_err());
        registry
            .set_audio_enabled(ClassId(12), UserId(1), false)
            .await
            .unwrap();

        let details = registry.stream_status(ClassId(12)).await.details.unwrap();
        assert!(!details.audio_enabled);
        assert_eq!(s_sink.kinds(), vec!["audio-control"]);
    }

    #[tokio::test]
    async fn test_rooms_sorted_by_class() {
        let registry = registry();
        seat(&registry, 30, 1, Role::Teacher).await;
        seat(&registry, 10, 2, Role::Teacher).await;
        seat(&registry, 20, 3, Role::Teacher).await;

        let ids: Vec<u64> = registry.rooms().await.iter().map(|r| r.class_id.0).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn test_lifecycle_events_emitted() {
        let emitter = CollectingEmitter::default();
        let registry = RoomRegistry::new(Arc::new(emitter.clone()), Vec::new());
        let (id, _) = connect(&registry).await;
        registry
            .join(id, ClassId(1), UserId(1), Role::Teacher, None)
            .await
            .unwrap();
        registry.unregister(id).await;

        assert_eq!(
            emitter.events(),
            vec![
                RelayEvent::RoomOpened { class_id: ClassId(1) },
                RelayEvent::MemberJoined {
                    class_id: ClassId(1),
                    user_id: UserId(1),
                    role: Role::Teacher
                },
                RelayEvent::MemberLeft {
                    class_id: ClassId(1),
                    user_id: UserId(1)
                },
                RelayEvent::RoomClosed { class_id: ClassId(1) },
            ]
        );
    }

    #[tokio::test]
    async fn test_backend_event_relayed_as_notification() {
        let registry = registry();
        let (_s, s_sink) = seat(&registry, 1, 2, Role::Student).await;

        let report = registry
            .relay_backend_event(
                ClassId(1),
                BackendEventKind::StreamStarted,
                json!({"class_id": 1}),
            )
            .await;
        assert_eq!(report.delivered, 1);
        assert_eq!(s_sink.kinds(), vec!["notification"]);

        let none = registry
            .relay_backend_event(ClassId(2), BackendEventKind::SlideSync, json!({}))
            .await;
        assert_eq!(none.attempted(), 0);
    }
}
