//! UseCase: 接続処理
//!
//! 新しい WebSocket 接続を Connection Registry に登録し、
//! サーバーが採番した接続 ID をクライアントに通知します。

use std::sync::Arc;

use hiroba_shared::time::now_iso8601;
use tokio::sync::mpsc::UnboundedSender;

use crate::domain::{ConnectionId, ConnectionRegistry, RoomEvent};

/// 接続のユースケース
pub struct ConnectUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl ConnectUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 接続を登録し、`connected` イベントを送信
    ///
    /// 既に登録済みの ID では何もしない（冪等）。
    pub fn execute(&self, connection_id: &ConnectionId, sender: UnboundedSender<String>) {
        if self.registry.is_registered(connection_id) {
            tracing::debug!("Connection '{}' is already registered", connection_id);
            return;
        }
        self.registry.register(connection_id.clone(), sender);
        self.registry.emit_to(
            connection_id,
            &RoomEvent::Connected {
                connection_id: connection_id.clone(),
                time: now_iso8601(),
            },
        );
    }
}
