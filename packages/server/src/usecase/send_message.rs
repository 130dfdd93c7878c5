//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージの保存、送信者へのエコー、ルームへのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 送信者が保存の成否に関わらず自分のメッセージを受け取ることを保証
//! - 保存に失敗したメッセージが他のメンバーに配信されないことを保証
//! - 他のルームにメッセージが漏れないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：テキスト・ファイルメッセージの送信
//! - 異常系：保存失敗
//! - エッジケース：送信者のみがルームにいる場合、ルームに参加していない送信者

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, Message, MessageBody, MessageRepository, MessageSubmission,
    RepositoryError, RoomEvent,
};

use super::error::GatewayError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    messages: Arc<dyn MessageRepository>,
}

impl SendMessageUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>, messages: Arc<dyn MessageRepository>) -> Self {
        Self { registry, messages }
    }

    /// メッセージ送信を実行
    ///
    /// 送信者には保存結果を待ってから、クライアントが付けた ID と時刻のまま
    /// メッセージを返す。保存に成功した場合のみ、送信者以外のルームのメンバーに配信する。
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 配信できた他のメンバーの数
    /// * `Err(GatewayError::PersistenceFailure)` - 保存失敗（ブロードキャストなし）
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        submission: MessageSubmission,
    ) -> Result<usize, GatewayError> {
        // 1. 保存
        let persisted = self.persist(&submission).await;

        // 2. 送信者へのエコー（保存の成否に関わらず）
        let room_id = submission.room_id.clone();
        let event = RoomEvent::ReceiveMessage(submission);
        self.registry.emit_to(connection_id, &event);

        let message = persisted.map_err(GatewayError::PersistenceFailure)?;
        tracing::debug!("Stored message '{}' in room '{}'", message.id, room_id);

        // 3. 送信者以外のルームのメンバーに配信
        Ok(self
            .registry
            .emit_to_room(&room_id, &event, Some(connection_id)))
    }

    async fn persist(&self, submission: &MessageSubmission) -> Result<Message, RepositoryError> {
        match &submission.body {
            MessageBody::Text(text) => {
                self.messages
                    .create_text_message(text.clone(), &submission.user_id, &submission.room_id)
                    .await
            }
            MessageBody::Files(files) => {
                self.messages
                    .create_file_message(&submission.user_id, &submission.room_id, files.clone())
                    .await
            }
        }
    }
}
