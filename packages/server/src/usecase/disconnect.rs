//! UseCase: 切断処理
//!
//! 接続を Connection Registry から外した後、所属していたルームから退出させます。
//! 先に登録を外すことで、処理中の参加がメンバーを復活させることを防ぎます。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, MembershipEntry, RoomId};

use super::leave_room::LeaveRoomUseCase;

/// 切断のユースケース
pub struct DisconnectUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    leave_room: LeaveRoomUseCase,
}

impl DisconnectUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>, leave_room: LeaveRoomUseCase) -> Self {
        Self {
            registry,
            leave_room,
        }
    }

    /// 切断を実行
    ///
    /// 二度目以降の呼び出しでは何も起きない。
    pub fn execute(&self, connection_id: &ConnectionId) -> Option<(RoomId, MembershipEntry)> {
        let was_registered = self.registry.unregister(connection_id);
        let left = self.leave_room.execute(connection_id);
        if was_registered {
            tracing::info!(
                "Connection '{}' disconnected ({} connection(s) remaining)",
                connection_id,
                self.registry.connection_count()
            );
        }
        left
    }
}
