//! Factories for server-assigned identifiers.

use super::{ConnectionId, MessageId, error::ValueObjectError};

/// Factory for server-assigned connection identifiers.
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> Result<ConnectionId, ValueObjectError> {
        ConnectionId::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Factory for identifiers assigned to stored messages.
pub struct MessageIdFactory;

impl MessageIdFactory {
    pub fn generate() -> Result<MessageId, ValueObjectError> {
        MessageId::new(uuid::Uuid::new_v4().to_string())
    }
}
