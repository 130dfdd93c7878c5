//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - Membership Index への追加と `userJoinRoom` の二重送信（本人と他のメンバー）
//!
//! ### なぜこのテストが必要か
//! - 参加したクライアントと既存のクライアントが同じメンバー一覧に収束することを保証
//! - 存在しないルームへの参加がインデックスを変更しないことを保証
//! - 切断と競合した参加がメンバーを復活させないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：空のルーム、既存メンバーのいるルームへの参加
//! - 異常系：存在しないルーム、ルーム検索中に切断された接続（移動中の切断を含む）
//! - エッジケース：別ルームからの移動、同じルームへの再参加

use std::sync::Arc;

use hiroba_shared::time::now_iso8601;

use crate::domain::{
    ConnectionId, ConnectionRegistry, Joined, MembershipEntry, RoomEvent, RoomId,
    RoomMembershipIndex, UserId,
};

use super::error::GatewayError;

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    membership: Arc<RoomMembershipIndex>,
}

impl JoinRoomUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>, membership: Arc<RoomMembershipIndex>) -> Self {
        Self {
            registry,
            membership,
        }
    }

    /// ルーム参加を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Joined)` - 参加成功（前に所属していたルームがあればそれも返す）
    /// * `Err(GatewayError)` - ルームが存在しない、または接続が既に切断されている
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        user_id: UserId,
    ) -> Result<Joined, GatewayError> {
        self.ensure_live(connection_id)?;

        // 1. Membership Index に追加（ルーム検索の間に他の接続のイベントが割り込みうる）
        let joined = self
            .membership
            .join(
                room_id,
                MembershipEntry::new(connection_id.clone(), user_id.clone()),
            )
            .await?;

        // 2. 検索中に切断されていたら追加を取り消す
        if let Err(e) = self.ensure_live(connection_id) {
            self.roll_back(connection_id, room_id);
            // 移動元のルームには退出を通知する
            if let Some((previous_room, previous_entry)) = &joined.previous {
                self.announce_departure(
                    connection_id,
                    previous_room,
                    previous_entry,
                    now_iso8601(),
                );
            }
            return Err(e);
        }

        let time = now_iso8601();

        // 3. 別ルームから移動した場合は、そのルームに退出を通知
        if let Some((previous_room, previous_entry)) = &joined.previous {
            self.announce_departure(connection_id, previous_room, previous_entry, time.clone());
            tracing::info!(
                "Connection '{}' moved from room '{}' to '{}'",
                connection_id,
                previous_room,
                room_id
            );
        }

        // 4. ルームのブロードキャストグループに参加
        self.registry.join_group(room_id, connection_id);

        // 5. 送信直前にもう一度確認し、切断済みなら参加を取り消す
        if let Err(e) = self.ensure_live(connection_id) {
            self.roll_back(connection_id, room_id);
            return Err(e);
        }

        // 6. 本人と他のメンバーに同じスナップショットを送信
        let event = RoomEvent::UserJoinRoom {
            room_id: room_id.clone(),
            user_id,
            time,
            users: self.membership.members_of(room_id),
        };
        self.registry.emit_to(connection_id, &event);
        let notified = self.registry.emit_to_room(room_id, &event, Some(connection_id));
        tracing::info!(
            "Connection '{}' joined room '{}' ({} other member(s) notified)",
            connection_id,
            room_id,
            notified
        );

        Ok(joined)
    }

    fn roll_back(&self, connection_id: &ConnectionId, room_id: &RoomId) {
        self.membership.leave(room_id, connection_id);
        self.registry.leave_group(room_id, connection_id);
        tracing::debug!(
            "Connection '{}' went away while joining room '{}'; join rolled back",
            connection_id,
            room_id
        );
    }

    /// `previous_room` の残りのメンバーに `userDisconnect` を送る
    fn announce_departure(
        &self,
        connection_id: &ConnectionId,
        previous_room: &RoomId,
        previous_entry: &MembershipEntry,
        time: String,
    ) {
        self.registry.leave_group(previous_room, connection_id);
        self.registry.emit_to_room(
            previous_room,
            &RoomEvent::UserDisconnect {
                room_id: previous_room.clone(),
                time,
                entry: previous_entry.clone(),
            },
            Some(connection_id),
        );
    }

    fn ensure_live(&self, connection_id: &ConnectionId) -> Result<(), GatewayError> {
        if self.registry.is_registered(connection_id) {
            Ok(())
        } else {
            Err(GatewayError::StaleConnection(connection_id.to_string()))
        }
    }
}
