//! UseCase: ルーム退出処理
//!
//! 明示的な `leaveRoom` と切断時の後片付けの両方から使われます。
//! 接続が現在いるルームを逆引きし、残ったメンバーに `userDisconnect` を通知します。

use std::sync::Arc;

use hiroba_shared::time::now_iso8601;

use crate::domain::{
    ConnectionId, ConnectionRegistry, MembershipEntry, RoomEvent, RoomId, RoomMembershipIndex,
};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    membership: Arc<RoomMembershipIndex>,
}

impl LeaveRoomUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>, membership: Arc<RoomMembershipIndex>) -> Self {
        Self {
            registry,
            membership,
        }
    }

    /// 接続を現在のルームから退出させる
    ///
    /// どのルームにもいない場合は何もせず `None` を返す。
    pub fn execute(&self, connection_id: &ConnectionId) -> Option<(RoomId, MembershipEntry)> {
        let (room_id, _) = self.membership.locate(connection_id)?;
        let entry = self.membership.leave(&room_id, connection_id)?;
        self.registry.leave_group(&room_id, connection_id);

        let remaining = self.registry.emit_to_room(
            &room_id,
            &RoomEvent::UserDisconnect {
                room_id: room_id.clone(),
                time: now_iso8601(),
                entry: entry.clone(),
            },
            Some(connection_id),
        );
        tracing::info!(
            "Connection '{}' left room '{}' ({} member(s) notified)",
            connection_id,
            room_id,
            remaining
        );

        Some((room_id, entry))
    }
}
