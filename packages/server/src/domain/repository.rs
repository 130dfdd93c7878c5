//! Repository trait 定義
//!
//! ドメイン層が必要とする外部コラボレーター（永続化）のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    ChatRoom, FileDescriptor, Message, RepositoryError, RoomId, Timestamp, User, UserId,
};

/// Room lookup and room metadata.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Room を取得（存在しなければ `None`）
    async fn find_room(&self, room_id: &RoomId) -> Result<Option<ChatRoom>, RepositoryError>;

    /// 全ての Room を最終更新の新しい順に取得
    async fn list_rooms(&self) -> Result<Vec<ChatRoom>, RepositoryError>;

    /// Room を作成
    async fn create_room(&self, room: ChatRoom) -> Result<ChatRoom, RepositoryError>;

    /// Room の最終アクティビティを更新
    async fn touch_room(&self, room_id: &RoomId, at: Timestamp) -> Result<(), RepositoryError>;

    /// ユーザーを Room のメンバーとして記録
    async fn add_room_member(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> Result<(), RepositoryError>;
}

/// Message persistence.
///
/// Both create operations bump the room's activity timestamp as a side effect.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// テキストメッセージを保存
    async fn create_text_message(
        &self,
        text: String,
        user_id: &UserId,
        room_id: &RoomId,
    ) -> Result<Message, RepositoryError>;

    /// ファイルメッセージを保存（テキストは空）
    async fn create_file_message(
        &self,
        user_id: &UserId,
        room_id: &RoomId,
        files: Vec<FileDescriptor>,
    ) -> Result<Message, RepositoryError>;

    /// Room のメッセージ履歴を作成順に取得
    async fn list_messages(&self, room_id: &RoomId) -> Result<Vec<Message>, RepositoryError>;
}

/// User lookup, used for presence enrichment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 指定された ID のユーザーを取得（存在しない ID は無視）
    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError>;

    /// ユーザーを作成
    async fn create_user(&self, user: User) -> Result<User, RepositoryError>;
}
