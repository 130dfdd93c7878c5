//! Events the server pushes to connected clients.

use super::{ConnectionId, MembershipEntry, MessageSubmission, RoomId, UserId};

/// Server → client event, independent of the wire encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// Handshake: tells a client its server-assigned connection id
    Connected {
        connection_id: ConnectionId,
        time: String,
    },
    /// A user joined `room_id`; `users` is the member snapshot after the join
    UserJoinRoom {
        room_id: RoomId,
        user_id: UserId,
        time: String,
        users: Vec<MembershipEntry>,
    },
    /// `entry` left `room_id`, explicitly or by disconnecting
    UserDisconnect {
        room_id: RoomId,
        time: String,
        entry: MembershipEntry,
    },
    /// A chat message, echoed to its sender or broadcast to the room
    ReceiveMessage(MessageSubmission),
    /// Failure scoped to the receiving connection
    Error { msg: String },
}

impl RoomEvent {
    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error { msg: msg.into() }
    }

    /// Event name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::UserJoinRoom { .. } => "userJoinRoom",
            Self::UserDisconnect { .. } => "userDisconnect",
            Self::ReceiveMessage(_) => "receiveMessage",
            Self::Error { .. } => "error",
        }
    }
}
