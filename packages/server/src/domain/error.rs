//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("ConnectionId cannot be empty")]
    ConnectionIdEmpty,

    #[error("ConnectionId cannot exceed {max} characters (got {actual})")]
    ConnectionIdTooLong { max: usize, actual: usize },

    #[error("UserId cannot be empty")]
    UserIdEmpty,

    #[error("UserId cannot exceed {max} characters (got {actual})")]
    UserIdTooLong { max: usize, actual: usize },

    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    #[error("RoomId cannot exceed {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    #[error("MessageId cannot be empty")]
    MessageIdEmpty,

    #[error("MessageId cannot exceed {max} characters (got {actual})")]
    MessageIdTooLong { max: usize, actual: usize },

    /// A TEXT message must carry text
    #[error("Text message cannot be empty")]
    MessageTextEmpty,

    #[error("Text message cannot exceed {max} characters (got {actual})")]
    MessageTextTooLong { max: usize, actual: usize },

    /// A FILE message must carry at least one file descriptor
    #[error("File message must contain at least one file")]
    FileListEmpty,

    #[error("File name cannot be empty")]
    FileNameEmpty,
}

/// Errors raised by the persistence collaborators
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The backing store rejected or failed the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by the room membership index
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MembershipError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Room lookup failed: {0}")]
    Lookup(#[from] RepositoryError),
}
