//! In-memory implementations of the persistence ports.

mod message;
mod room;
mod user;

pub use message::InMemoryMessageRepository;
pub use room::InMemoryRoomRepository;
pub use user::InMemoryUserRepository;
