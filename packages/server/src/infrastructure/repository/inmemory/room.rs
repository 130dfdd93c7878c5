//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatRoom, RepositoryError, RoomId, RoomRepository, Timestamp, UserId};

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<RoomId, ChatRoom>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 初期データ付きで作成
    pub fn with_rooms(rooms: impl IntoIterator<Item = ChatRoom>) -> Self {
        Self {
            rooms: Mutex::new(rooms.into_iter().map(|room| (room.id.clone(), room)).collect()),
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn find_room(&self, room_id: &RoomId) -> Result<Option<ChatRoom>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        Ok(rooms.get(room_id).cloned())
    }

    async fn list_rooms(&self) -> Result<Vec<ChatRoom>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        let mut list: Vec<ChatRoom> = rooms.values().cloned().collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn create_room(&self, room: ChatRoom) -> Result<ChatRoom, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        rooms.insert(room.id.clone(), room.clone());
        Ok(room)
    }

    async fn touch_room(&self, room_id: &RoomId, at: Timestamp) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))?;
        room.touch(at);
        Ok(())
    }

    async fn add_room_member(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))?;
        room.add_member(user_id.clone());
        Ok(())
    }
}
