//! Core domain models for the chat application.

use serde::{Deserialize, Serialize};

use super::{
    error::ValueObjectError,
    value_object::{ConnectionId, MAX_TEXT_LENGTH, MessageId, RoomId, Timestamp, UserId},
};

/// A persisted chat room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoom {
    /// Room identifier
    pub id: RoomId,
    /// Display name
    pub name: String,
    /// Users that have posted to (and so belong to) the room
    pub member_ids: Vec<UserId>,
    /// Timestamp when the room was created
    pub created_at: Timestamp,
    /// Last activity; bumped on every stored message
    pub updated_at: Timestamp,
}

impl ChatRoom {
    /// Create a new room with no members
    pub fn new(id: RoomId, name: String, created_at: Timestamp) -> Self {
        Self {
            id,
            name,
            member_ids: Vec::new(),
            created_at,
            updated_at: created_at,
        }
    }

    /// Record `user_id` as a member; no-op if already present
    pub fn add_member(&mut self, user_id: UserId) {
        if !self.member_ids.contains(&user_id) {
            self.member_ids.push(user_id);
        }
    }

    /// Bump the activity timestamp
    pub fn touch(&mut self, at: Timestamp) {
        self.updated_at = at;
    }
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// One connection, on behalf of one user, present in one room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipEntry {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
}

impl MembershipEntry {
    pub fn new(connection_id: ConnectionId, user_id: UserId) -> Self {
        Self {
            connection_id,
            user_id,
        }
    }
}

/// Kind of a message body as named on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageKind {
    Text,
    File,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::File => "FILE",
        }
    }
}

/// A file attached to a FILE message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Storage key
    pub key: String,
    /// Retrieval URL
    pub url: String,
}

impl FileDescriptor {
    pub fn new(name: String, size: u64, key: String, url: String) -> Result<Self, ValueObjectError> {
        if name.is_empty() {
            return Err(ValueObjectError::FileNameEmpty);
        }
        Ok(Self {
            name,
            size,
            key,
            url,
        })
    }
}

/// Body of a message: exactly one of text or a non-empty file list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageBody {
    Text(String),
    Files(Vec<FileDescriptor>),
}

impl MessageBody {
    /// Normalize a wire-level (kind, text, files) triple into a body.
    ///
    /// TEXT keeps the text and drops any file list. FILE keeps the file list
    /// and drops the text, so a file message always has empty text.
    pub fn from_parts(
        kind: MessageKind,
        text: String,
        files: Option<Vec<FileDescriptor>>,
    ) -> Result<Self, ValueObjectError> {
        match kind {
            MessageKind::Text => {
                if text.is_empty() {
                    return Err(ValueObjectError::MessageTextEmpty);
                }
                let len = text.chars().count();
                if len > MAX_TEXT_LENGTH {
                    return Err(ValueObjectError::MessageTextTooLong {
                        max: MAX_TEXT_LENGTH,
                        actual: len,
                    });
                }
                Ok(Self::Text(text))
            }
            MessageKind::File => match files {
                Some(files) if !files.is_empty() => Ok(Self::Files(files)),
                _ => Err(ValueObjectError::FileListEmpty),
            },
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Text(_) => MessageKind::Text,
            Self::Files(_) => MessageKind::File,
        }
    }

    /// Text payload; empty for file messages
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Files(_) => "",
        }
    }

    pub fn files(&self) -> Option<&[FileDescriptor]> {
        match self {
            Self::Text(_) => None,
            Self::Files(files) => Some(files),
        }
    }
}

/// A stored message, as returned by the persistence adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub room_id: RoomId,
    pub user_id: UserId,
    pub body: MessageBody,
    pub created_at: Timestamp,
}

/// A message as submitted by a client over the realtime channel.
///
/// This transient copy is what gets echoed and broadcast: it keeps the
/// client-supplied identifier and timestamp rather than the stored ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSubmission {
    pub id: MessageId,
    pub room_id: RoomId,
    pub user_id: UserId,
    pub body: MessageBody,
    /// Client timestamp, passed through untouched
    pub created_at: String,
}
