//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{MembershipError, RepositoryError, ValueObjectError};

/// Failures of a gateway transition.
///
/// None of these is fatal: each is scoped to the originating connection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Room lookup failed: {0}")]
    RoomLookup(RepositoryError),

    #[error("Failed to persist message: {0}")]
    PersistenceFailure(RepositoryError),

    /// The connection was unregistered while the operation was in flight
    #[error("Connection '{0}' is no longer registered")]
    StaleConnection(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(#[from] ValueObjectError),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),
}

impl GatewayError {
    /// Text of the `error` event sent to the originating connection, or
    /// `None` when there is nobody left to tell.
    pub fn client_message(&self) -> Option<&'static str> {
        match self {
            Self::RoomNotFound(_) | Self::RoomLookup(_) => Some("Room not found"),
            Self::PersistenceFailure(_) => Some("Error adding message"),
            Self::InvalidMessage(_) => Some("Invalid message"),
            Self::InvalidEvent(_) => Some("Invalid event"),
            Self::StaleConnection(_) => None,
        }
    }
}

impl From<MembershipError> for GatewayError {
    fn from(error: MembershipError) -> Self {
        match error {
            MembershipError::RoomNotFound(room_id) => Self::RoomNotFound(room_id),
            MembershipError::Lookup(e) => Self::RoomLookup(e),
        }
    }
}
