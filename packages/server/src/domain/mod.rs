//! Domain layer for the chat application.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod membership;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use entity::{
    ChatRoom, FileDescriptor, MembershipEntry, Message, MessageBody, MessageKind,
    MessageSubmission, User,
};
pub use error::{MembershipError, RepositoryError, ValueObjectError};
pub use event::RoomEvent;
pub use factory::{ConnectionIdFactory, MessageIdFactory};
pub use membership::{Joined, RoomMembershipIndex};
pub use registry::ConnectionRegistry;
pub use repository::{MessageRepository, RoomRepository, UserRepository};
#[cfg(test)]
pub use repository::{MockMessageRepository, MockRoomRepository, MockUserRepository};
pub use value_object::{ConnectionId, MessageId, RoomId, Timestamp, UserId};
