//! HTTP API response DTOs for the chat application.

use serde::{Deserialize, Serialize};

use super::websocket::{FileDto, SocketWithUser};

/// Room summary for list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub name: String,
    /// Connections currently present in the room
    pub live_members: usize,
    pub created_at: String, // ISO 8601
    pub updated_at: String, // ISO 8601
}

/// Room detail for detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub name: String,
    /// Users recorded as members of the room
    pub member_ids: Vec<String>,
    /// Live membership snapshot
    pub online: Vec<SocketWithUser>,
    pub messages: Vec<MessageDto>,
    pub created_at: String, // ISO 8601
    pub updated_at: String, // ISO 8601
}

/// Stored message in room detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub r#type: String,
    pub text: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file: Vec<FileDto>,
    pub created_at: String, // ISO 8601
}

/// User returned by batch lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Query for batch user lookup: `?ids=a,b,c`
#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    #[serde(default)]
    pub ids: String,
}
