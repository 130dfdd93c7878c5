//! In-memory Connection Registry.
//!
//! Each live WebSocket connection is represented by the sending half of an
//! unbounded channel; the connection's writer task drains the other half into
//! the socket. Room groups mirror the membership index at the transport level.

use std::collections::HashSet;

use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    domain::{ConnectionId, ConnectionRegistry, RoomEvent, RoomId, Timestamp},
    infrastructure::dto::websocket::encode_event,
};

/// Client connection information
pub struct ClientInfo {
    /// Message sender channel
    pub sender: UnboundedSender<String>,
    /// Unix timestamp when connected (in JST, milliseconds)
    pub connected_at: Timestamp,
    /// Room groups this connection is subscribed to
    pub groups: HashSet<RoomId>,
}

#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    clients: DashMap<ConnectionId, ClientInfo>,
    groups: DashMap<RoomId, HashSet<ConnectionId>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connections subscribed to `room_id`, sorted for stable iteration
    pub fn group_members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let mut members: Vec<_> = self
            .groups
            .get(room_id)
            .map(|group| group.iter().cloned().collect())
            .unwrap_or_default();
        members.sort();
        members
    }

    fn send_raw(&self, connection_id: &ConnectionId, frame: String) -> bool {
        let Some(info) = self.clients.get(connection_id) else {
            tracing::debug!("Dropping event for stale connection '{}'", connection_id);
            return false;
        };
        if info.sender.send(frame).is_err() {
            tracing::warn!("Failed to send event to connection '{}'", connection_id);
            return false;
        }
        true
    }
}

impl ConnectionRegistry for InMemoryConnectionRegistry {
    fn register(&self, connection_id: ConnectionId, sender: UnboundedSender<String>) {
        if self.clients.contains_key(&connection_id) {
            return;
        }
        tracing::info!("Added connection '{}'", connection_id);
        self.clients
            .entry(connection_id)
            .or_insert_with(|| ClientInfo {
                sender,
                connected_at: Timestamp::now(),
                groups: HashSet::new(),
            });
    }

    fn unregister(&self, connection_id: &ConnectionId) -> bool {
        let Some((_, info)) = self.clients.remove(connection_id) else {
            return false;
        };
        for room_id in &info.groups {
            if let Some(mut group) = self.groups.get_mut(room_id) {
                group.remove(connection_id);
            }
        }
        tracing::info!(
            "Removed connection '{}' after {} ms ({} remaining)",
            connection_id,
            Timestamp::now().value() - info.connected_at.value(),
            self.clients.len()
        );
        true
    }

    fn is_registered(&self, connection_id: &ConnectionId) -> bool {
        self.clients.contains_key(connection_id)
    }

    fn join_group(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        {
            let Some(mut info) = self.clients.get_mut(connection_id) else {
                tracing::debug!(
                    "Not subscribing stale connection '{}' to room '{}'",
                    connection_id,
                    room_id
                );
                return;
            };
            info.groups.insert(room_id.clone());
        }
        self.groups
            .entry(room_id.clone())
            .or_default()
            .insert(connection_id.clone());
    }

    fn leave_group(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        if let Some(mut info) = self.clients.get_mut(connection_id) {
            info.groups.remove(room_id);
        }
        if let Some(mut group) = self.groups.get_mut(room_id) {
            group.remove(connection_id);
        }
    }

    fn emit_to(&self, connection_id: &ConnectionId, event: &RoomEvent) -> bool {
        match encode_event(event) {
            Ok(frame) => self.send_raw(connection_id, frame),
            Err(e) => {
                tracing::error!("Failed to encode '{}' event: {}", event.name(), e);
                false
            }
        }
    }

    fn emit_to_room(
        &self,
        room_id: &RoomId,
        event: &RoomEvent,
        exclude: Option<&ConnectionId>,
    ) -> usize {
        let frame = match encode_event(event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to encode '{}' event: {}", event.name(), e);
                return 0;
            }
        };

        // Snapshot the group so no shard lock is held while sending
        let targets: Vec<ConnectionId> = self
            .groups
            .get(room_id)
            .map(|group| {
                group
                    .iter()
                    .filter(|id| Some(*id) != exclude)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let delivered = targets
            .iter()
            .filter(|target| self.send_raw(target, frame.clone()))
            .count();
        tracing::debug!(
            "Broadcasted '{}' to {}/{} connection(s) in room '{}'",
            event.name(),
            delivered,
            targets.len(),
            room_id
        );
        delivered
    }

    fn connection_count(&self) -> usize {
        self.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn connection(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    #[test]
    fn test_register_is_idempotent() {
        // テスト項目: 同じ接続を二度登録しても一つだけ
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();

        // when (操作):
        registry.register(connection("a"), tx1);
        registry.register(connection("a"), tx2);
        registry.emit_to(&connection("a"), &RoomEvent::error("ping"));

        // then (期待する結果): 最初のチャンネルが保持される
        assert_eq!(registry.connection_count(), 1);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn test_emit_to_stale_connection_is_dropped() {
        // テスト項目: 登録されていない接続への送信は静かに失敗する
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();

        // when (操作):
        let delivered = registry.emit_to(&connection("ghost"), &RoomEvent::error("x"));

        // then (期待する結果):
        assert!(!delivered);
    }

    #[test]
    fn test_emit_to_room_excludes_origin() {
        // テスト項目: ルーム送信は除外された接続と他ルームには届かない
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let (tx_c, mut rx_c) = mpsc::unbounded_channel();
        registry.register(connection("a"), tx_a);
        registry.register(connection("b"), tx_b);
        registry.register(connection("c"), tx_c);
        registry.join_group(&room("room1"), &connection("a"));
        registry.join_group(&room("room1"), &connection("b"));
        registry.join_group(&room("room2"), &connection("c"));

        // when (操作):
        let delivered = registry.emit_to_room(
            &room("room1"),
            &RoomEvent::error("hello"),
            Some(&connection("a")),
        );

        // then (期待する結果):
        assert_eq!(delivered, 1);
        assert!(rx_a.try_recv().is_err());
        let frame = rx_b.try_recv().unwrap();
        assert!(frame.contains("\"event\":\"error\""));
        assert!(rx_c.try_recv().is_err());
    }

    #[test]
    fn test_unregister_removes_group_subscriptions() {
        // テスト項目: 登録解除でルームグループからも削除される
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        registry.register(connection("a"), tx);
        registry.join_group(&room("room1"), &connection("a"));

        // when (操作):
        let removed = registry.unregister(&connection("a"));
        let removed_again = registry.unregister(&connection("a"));

        // then (期待する結果):
        assert!(removed);
        assert!(!removed_again);
        assert!(!registry.is_registered(&connection("a")));
        assert!(registry.group_members(&room("room1")).is_empty());
    }

    #[test]
    fn test_join_group_ignores_stale_connection() {
        // テスト項目: 未登録の接続はルームグループに追加されない
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();

        // when (操作):
        registry.join_group(&room("room1"), &connection("ghost"));

        // then (期待する結果):
        assert!(registry.group_members(&room("room1")).is_empty());
    }

    #[test]
    fn test_leave_group() {
        // テスト項目: グループから抜けた接続にはルーム送信が届かない
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(connection("a"), tx);
        registry.join_group(&room("room1"), &connection("a"));

        // when (操作):
        registry.leave_group(&room("room1"), &connection("a"));
        let delivered = registry.emit_to_room(&room("room1"), &RoomEvent::error("x"), None);

        // then (期待する結果):
        assert_eq!(delivered, 0);
        assert!(rx.try_recv().is_err());
    }
}
