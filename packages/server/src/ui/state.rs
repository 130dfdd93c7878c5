//! Shared application state.

use std::sync::Arc;

use crate::{
    domain::{
        ConnectionRegistry, MessageRepository, RoomMembershipIndex, RoomRepository, UserRepository,
    },
    usecase::RoomGateway,
};

/// Shared application state
pub struct AppState {
    /// Realtime transitions of every connection go through the gateway
    pub gateway: RoomGateway,
    /// Live membership, read by the HTTP handlers
    pub membership: Arc<RoomMembershipIndex>,
    pub rooms: Arc<dyn RoomRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        rooms: Arc<dyn RoomRepository>,
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        let membership = Arc::new(RoomMembershipIndex::new(rooms.clone()));
        Self {
            gateway: RoomGateway::new(registry, membership.clone(), messages.clone()),
            membership,
            rooms,
            messages,
            users,
        }
    }
}
