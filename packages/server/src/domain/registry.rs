//! Connection Registry port.
//!
//! Every emit to a live connection goes through this trait; nothing else in
//! the core holds a transport handle.

use tokio::sync::mpsc::UnboundedSender;

use super::{ConnectionId, RoomEvent, RoomId};

/// Tracks live connections and the transport-level room groups they are
/// subscribed to.
///
/// Emits never fail loudly: a target that is no longer registered is a
/// stale connection, which is logged and dropped.
pub trait ConnectionRegistry: Send + Sync {
    /// Register a connection. No-op if `connection_id` is already registered.
    fn register(&self, connection_id: ConnectionId, sender: UnboundedSender<String>);

    /// Remove a connection and all of its group subscriptions.
    ///
    /// Returns `false` if it was not registered.
    fn unregister(&self, connection_id: &ConnectionId) -> bool;

    fn is_registered(&self, connection_id: &ConnectionId) -> bool;

    /// Subscribe a registered connection to the broadcast group of `room_id`.
    fn join_group(&self, room_id: &RoomId, connection_id: &ConnectionId);

    fn leave_group(&self, room_id: &RoomId, connection_id: &ConnectionId);

    /// Send `event` to exactly one connection. Returns whether it was delivered.
    fn emit_to(&self, connection_id: &ConnectionId, event: &RoomEvent) -> bool;

    /// Send `event` to every connection in the group of `room_id`, except
    /// `exclude`. Returns the number of connections reached.
    fn emit_to_room(
        &self,
        room_id: &RoomId,
        event: &RoomEvent,
        exclude: Option<&ConnectionId>,
    ) -> usize;

    /// Number of live connections
    fn connection_count(&self) -> usize;
}
