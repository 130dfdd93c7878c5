//! Room Gateway
//!
//! Per-connection state machine over the use cases:
//!
//! ```text
//! connect ──▶ Connected ──joinRoom──▶ InRoom(room) ──leaveRoom──▶ Connected
//!                 │                      │  ▲
//!                 │                      └──┘ joinRoom (moves rooms)
//!                 └──────── disconnect ──────┴──────────▶ Disconnected
//! ```
//!
//! Every failure is reported to the originating connection as an `error`
//! event; nothing here closes a connection.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::domain::{
    ConnectionId, ConnectionRegistry, MessageRepository, MessageSubmission, RoomEvent, RoomId,
    RoomMembershipIndex, UserId,
};

use super::{
    connect::ConnectUseCase, disconnect::DisconnectUseCase, error::GatewayError,
    join_room::JoinRoomUseCase, leave_room::LeaveRoomUseCase, send_message::SendMessageUseCase,
};

/// Where a connection is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    InRoom(RoomId),
    Disconnected,
}

pub struct RoomGateway {
    registry: Arc<dyn ConnectionRegistry>,
    membership: Arc<RoomMembershipIndex>,
    connect: ConnectUseCase,
    join_room: JoinRoomUseCase,
    send_message: SendMessageUseCase,
    leave_room: LeaveRoomUseCase,
    disconnect: DisconnectUseCase,
}

impl RoomGateway {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        membership: Arc<RoomMembershipIndex>,
        messages: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            connect: ConnectUseCase::new(registry.clone()),
            join_room: JoinRoomUseCase::new(registry.clone(), membership.clone()),
            send_message: SendMessageUseCase::new(registry.clone(), messages),
            leave_room: LeaveRoomUseCase::new(registry.clone(), membership.clone()),
            disconnect: DisconnectUseCase::new(
                registry.clone(),
                LeaveRoomUseCase::new(registry.clone(), membership.clone()),
            ),
            registry,
            membership,
        }
    }

    pub fn state(&self, connection_id: &ConnectionId) -> ConnectionState {
        if !self.registry.is_registered(connection_id) {
            return ConnectionState::Disconnected;
        }
        match self.membership.locate(connection_id) {
            Some((room_id, _)) => ConnectionState::InRoom(room_id),
            None => ConnectionState::Connected,
        }
    }

    pub fn connect(&self, connection_id: &ConnectionId, sender: UnboundedSender<String>) {
        self.connect.execute(connection_id, sender);
    }

    pub async fn join_room(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        user_id: UserId,
    ) -> Result<(), GatewayError> {
        self.join_room
            .execute(connection_id, room_id, user_id)
            .await
            .map(|_| ())
            .inspect_err(|e| self.report(connection_id, e))
    }

    pub async fn send_message(
        &self,
        connection_id: &ConnectionId,
        submission: MessageSubmission,
    ) -> Result<usize, GatewayError> {
        self.send_message
            .execute(connection_id, submission)
            .await
            .inspect_err(|e| self.report(connection_id, e))
    }

    /// `requested` is the room named by the client; the current room is
    /// always the one left.
    pub fn leave_room(&self, connection_id: &ConnectionId, requested: Option<&str>) {
        match self.leave_room.execute(connection_id) {
            Some((room_id, _)) if requested.is_some_and(|r| r != room_id.as_str()) => {
                tracing::debug!(
                    "Connection '{}' asked to leave '{}' but was in '{}'",
                    connection_id,
                    requested.unwrap_or_default(),
                    room_id
                );
            }
            Some(_) => {}
            None => tracing::debug!("Connection '{}' is not in any room", connection_id),
        }
    }

    pub fn disconnect(&self, connection_id: &ConnectionId) {
        self.disconnect.execute(connection_id);
    }

    /// Report a failure detected before any transition ran, such as an
    /// undecodable frame or an invalid message.
    pub fn reject(&self, connection_id: &ConnectionId, error: GatewayError) {
        self.report(connection_id, &error);
    }

    fn report(&self, connection_id: &ConnectionId, error: &GatewayError) {
        match error.client_message() {
            Some(msg) => {
                tracing::warn!("Connection '{}': {}", connection_id, error);
                self.registry.emit_to(connection_id, &RoomEvent::error(msg));
            }
            None => tracing::debug!("Connection '{}': {}", connection_id, error),
        }
    }
}
