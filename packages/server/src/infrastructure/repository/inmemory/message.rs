//! InMemory Message Repository 実装
//!
//! メッセージを保存し、保存済みの正規形（サーバー採番の ID とタイムスタンプ）を返します。
//! 保存のたびに Room の最終アクティビティを更新します。
//! 存在しないユーザーや Room からのメッセージは何も書き込まずに拒否します。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    FileDescriptor, Message, MessageBody, MessageIdFactory, MessageRepository, RepositoryError,
    RoomId, RoomRepository, Timestamp, UserId, UserRepository,
};

/// インメモリ Message Repository 実装
pub struct InMemoryMessageRepository {
    rooms: Arc<dyn RoomRepository>,
    users: Arc<dyn UserRepository>,
    messages: Mutex<Vec<Message>>,
}

impl InMemoryMessageRepository {
    pub fn new(rooms: Arc<dyn RoomRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            rooms,
            users,
            messages: Mutex::new(Vec::new()),
        }
    }

    async fn store(
        &self,
        user_id: &UserId,
        room_id: &RoomId,
        body: MessageBody,
    ) -> Result<Message, RepositoryError> {
        if self.users.find_users(std::slice::from_ref(user_id)).await?.is_empty() {
            return Err(RepositoryError::UserNotFound(user_id.to_string()));
        }

        // The author becomes a persisted member of the room; this also
        // rejects unknown rooms before anything is written.
        self.rooms.add_room_member(room_id, user_id).await?;

        let id = MessageIdFactory::generate()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        let message = Message {
            id,
            room_id: room_id.clone(),
            user_id: user_id.clone(),
            body,
            created_at: Timestamp::now(),
        };
        self.messages.lock().await.push(message.clone());

        // Not rolled back: the message is stored even if the bump fails.
        if let Err(e) = self.rooms.touch_room(room_id, message.created_at).await {
            tracing::warn!("Failed to update activity of room '{}': {}", room_id, e);
        }

        Ok(message)
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create_text_message(
        &self,
        text: String,
        user_id: &UserId,
        room_id: &RoomId,
    ) -> Result<Message, RepositoryError> {
        self.store(user_id, room_id, MessageBody::Text(text)).await
    }

    async fn create_file_message(
        &self,
        user_id: &UserId,
        room_id: &RoomId,
        files: Vec<FileDescriptor>,
    ) -> Result<Message, RepositoryError> {
        self.store(user_id, room_id, MessageBody::Files(files)).await
    }

    async fn list_messages(&self, room_id: &RoomId) -> Result<Vec<Message>, RepositoryError> {
        let messages = self.messages.lock().await;
        Ok(messages
            .iter()
            .filter(|message| &message.room_id == room_id)
            .cloned()
            .collect())
    }
}
