//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use hiroba_shared::time::timestamp_to_jst_rfc3339;

use crate::{
    domain::{ChatRoom, Message, RepositoryError, RoomId, User, UserId},
    infrastructure::dto::{
        http::{MessageDto, RoomDetailDto, RoomSummaryDto, UserDto, UsersQuery},
        websocket::{FileDto, SocketWithUser},
    },
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms, most recently active first
pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoomSummaryDto>>, StatusCode> {
    let rooms = state.rooms.list_rooms().await.map_err(internal_error)?;

    let summaries = rooms
        .into_iter()
        .map(|room| RoomSummaryDto {
            live_members: state.membership.member_count(&room.id),
            id: room.id.into_string(),
            name: room.name,
            created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
            updated_at: timestamp_to_jst_rfc3339(room.updated_at.value()),
        })
        .collect();

    Ok(Json(summaries))
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::NOT_FOUND)?;
    let room = state
        .rooms
        .find_room(&room_id)
        .await
        .map_err(internal_error)?
        .ok_or(StatusCode::NOT_FOUND)?;
    let messages = state
        .messages
        .list_messages(&room_id)
        .await
        .map_err(internal_error)?;

    Ok(Json(room_detail(
        room,
        state
            .membership
            .members_of(&room_id)
            .iter()
            .map(SocketWithUser::from)
            .collect(),
        messages,
    )))
}

/// Batch user lookup: `/api/users?ids=a,b`
pub async fn get_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsersQuery>,
) -> Result<Json<Vec<UserDto>>, StatusCode> {
    let ids: Vec<UserId> = query
        .ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .filter_map(|id| UserId::new(id.to_string()).ok())
        .collect();
    if ids.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let users = state.users.find_users(&ids).await.map_err(internal_error)?;
    Ok(Json(users.into_iter().map(user_dto).collect()))
}

fn room_detail(room: ChatRoom, online: Vec<SocketWithUser>, messages: Vec<Message>) -> RoomDetailDto {
    RoomDetailDto {
        id: room.id.into_string(),
        name: room.name,
        member_ids: room.member_ids.into_iter().map(UserId::into_string).collect(),
        online,
        messages: messages.into_iter().map(message_dto).collect(),
        created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
        updated_at: timestamp_to_jst_rfc3339(room.updated_at.value()),
    }
}

fn message_dto(message: Message) -> MessageDto {
    MessageDto {
        id: message.id.into_string(),
        r#type: message.body.kind().as_str().to_string(),
        text: message.body.text().to_string(),
        user_id: message.user_id.into_string(),
        file: message
            .body
            .files()
            .map(|files| files.iter().map(FileDto::from).collect())
            .unwrap_or_default(),
        created_at: timestamp_to_jst_rfc3339(message.created_at.value()),
    }
}

fn user_dto(user: User) -> UserDto {
    UserDto {
        id: user.id.into_string(),
        name: user.name,
        email: user.email,
    }
}

fn internal_error(error: RepositoryError) -> StatusCode {
    tracing::error!("Repository error: {}", error);
    StatusCode::INTERNAL_SERVER_ERROR
}
