//! WebSocket event DTOs for the chat application.
//!
//! Every frame is a JSON envelope `{"event": "<name>", "data": {...}}`.
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::domain::{
    FileDescriptor, MembershipEntry, MessageBody, MessageId, MessageKind, MessageSubmission,
    RoomEvent, RoomId, UserId, ValueObjectError,
};

// ============================================
// Client → Server
// ============================================

/// All events a client can send.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    JoinRoom(JoinRoomPayload),
    Message(MessagePayload),
    LeaveRoom(LeaveRoomPayload),
}

/// Connection id as known to the client, paired with its user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketWithUser {
    pub socket: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub chat_room_id: String,
    #[serde(default)]
    pub time: String,
    pub socket_with_user: SocketWithUser,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaveRoomPayload {
    #[serde(default)]
    pub room: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDto {
    pub name: String,
    pub size: u64,
    pub key: String,
    pub url: String,
}

/// Chat message, used both for `message` and `receiveMessage`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub text: String,
    pub chat_room_id: String,
    pub user_id: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Vec<FileDto>>,
}

// ============================================
// Server → Client
// ============================================

/// All events the server can send.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    Connected(ConnectedPayload),
    UserJoinRoom(UserJoinRoomPayload),
    UserDisconnect(UserDisconnectPayload),
    ReceiveMessage(MessagePayload),
    Error(ErrorPayload),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedPayload {
    pub socket: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJoinRoomPayload {
    pub chat_room_id: String,
    pub user_id: String,
    pub time: String,
    pub users: Vec<SocketWithUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDisconnectPayload {
    pub chat_room_id: String,
    pub time: String,
    pub socket_with_user: SocketWithUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub msg: String,
}

// ============================================
// Conversions
// ============================================

impl From<&MembershipEntry> for SocketWithUser {
    fn from(entry: &MembershipEntry) -> Self {
        Self {
            socket: entry.connection_id.as_str().to_string(),
            user_id: entry.user_id.as_str().to_string(),
        }
    }
}

impl From<&FileDescriptor> for FileDto {
    fn from(file: &FileDescriptor) -> Self {
        Self {
            name: file.name.clone(),
            size: file.size,
            key: file.key.clone(),
            url: file.url.clone(),
        }
    }
}

impl TryFrom<FileDto> for FileDescriptor {
    type Error = ValueObjectError;

    fn try_from(dto: FileDto) -> Result<Self, Self::Error> {
        FileDescriptor::new(dto.name, dto.size, dto.key, dto.url)
    }
}

impl From<&MessageSubmission> for MessagePayload {
    fn from(message: &MessageSubmission) -> Self {
        Self {
            id: message.id.as_str().to_string(),
            kind: message.body.kind(),
            text: message.body.text().to_string(),
            chat_room_id: message.room_id.as_str().to_string(),
            user_id: message.user_id.as_str().to_string(),
            created_at: message.created_at.clone(),
            file: message
                .body
                .files()
                .map(|files| files.iter().map(FileDto::from).collect()),
        }
    }
}

impl TryFrom<MessagePayload> for MessageSubmission {
    type Error = ValueObjectError;

    fn try_from(payload: MessagePayload) -> Result<Self, Self::Error> {
        let files = payload
            .file
            .map(|files| {
                files
                    .into_iter()
                    .map(FileDescriptor::try_from)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(Self {
            id: MessageId::new(payload.id)?,
            room_id: RoomId::new(payload.chat_room_id)?,
            user_id: UserId::new(payload.user_id)?,
            body: MessageBody::from_parts(payload.kind, payload.text, files)?,
            created_at: payload.created_at,
        })
    }
}

impl From<&RoomEvent> for ServerEvent {
    fn from(event: &RoomEvent) -> Self {
        match event {
            RoomEvent::Connected {
                connection_id,
                time,
            } => Self::Connected(ConnectedPayload {
                socket: connection_id.as_str().to_string(),
                time: time.clone(),
            }),
            RoomEvent::UserJoinRoom {
                room_id,
                user_id,
                time,
                users,
            } => Self::UserJoinRoom(UserJoinRoomPayload {
                chat_room_id: room_id.as_str().to_string(),
                user_id: user_id.as_str().to_string(),
                time: time.clone(),
                users: users.iter().map(SocketWithUser::from).collect(),
            }),
            RoomEvent::UserDisconnect {
                room_id,
                time,
                entry,
            } => Self::UserDisconnect(UserDisconnectPayload {
                chat_room_id: room_id.as_str().to_string(),
                time: time.clone(),
                socket_with_user: SocketWithUser::from(entry),
            }),
            RoomEvent::ReceiveMessage(message) => {
                Self::ReceiveMessage(MessagePayload::from(message))
            }
            RoomEvent::Error { msg } => Self::Error(ErrorPayload { msg: msg.clone() }),
        }
    }
}

/// Encode a domain event as a text frame.
pub fn encode_event(event: &RoomEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ServerEvent::from(event))
}

/// Decode a text frame sent by a client.
pub fn decode_client_event(text: &str) -> Result<ClientEvent, serde_json::Error> {
    serde_json::from_str(text)
}
