//! Test fixtures shared by the use case tests.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    domain::{
        ChatRoom, ConnectionId, ConnectionRegistry, MembershipEntry, MessageRepository, RoomId,
        RoomMembershipIndex, Timestamp, User, UserId,
    },
    infrastructure::{
        InMemoryConnectionRegistry,
        dto::websocket::ServerEvent,
        repository::{InMemoryMessageRepository, InMemoryRoomRepository, InMemoryUserRepository},
    },
};

/// Users known to the fixture's user store
pub const USERS: [&str; 3] = ["user1", "user2", "user3"];

pub struct Fixture {
    pub registry: Arc<InMemoryConnectionRegistry>,
    pub membership: Arc<RoomMembershipIndex>,
    pub messages: Arc<dyn MessageRepository>,
}

impl Fixture {
    /// Fixture whose room store contains `rooms` and whose user store contains [`USERS`]
    pub fn with_rooms(rooms: &[&str]) -> Self {
        let rooms = Arc::new(InMemoryRoomRepository::with_rooms(rooms.iter().map(|id| {
            ChatRoom::new(room_id(id), format!("{id} room"), Timestamp::new(0))
        })));
        let users = Arc::new(InMemoryUserRepository::with_users(USERS.iter().map(|id| User {
            id: user_id(id),
            name: id.to_string(),
            email: format!("{id}@example.com"),
        })));
        Self {
            registry: Arc::new(InMemoryConnectionRegistry::new()),
            membership: Arc::new(RoomMembershipIndex::new(rooms.clone())),
            messages: Arc::new(InMemoryMessageRepository::new(rooms, users)),
        }
    }

    /// Replace the message store, e.g. with a mock
    pub fn messages(mut self, messages: Arc<dyn MessageRepository>) -> Self {
        self.messages = messages;
        self
    }

    /// Register a connection and return the receiving end of its channel
    pub fn connect(&self, id: &str) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.registry.register(connection_id(id), tx);
        rx
    }
}

pub fn connection_id(id: &str) -> ConnectionId {
    ConnectionId::new(id.to_string()).unwrap()
}

pub fn room_id(id: &str) -> RoomId {
    RoomId::new(id.to_string()).unwrap()
}

pub fn user_id(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

pub fn entry(connection: &str, user: &str) -> MembershipEntry {
    MembershipEntry::new(connection_id(connection), user_id(user))
}

/// Decode every frame queued for a connection
pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        events.push(serde_json::from_str(&frame).unwrap());
    }
    events
}
