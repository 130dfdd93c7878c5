//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から Room Gateway 経由で呼び出され、Domain 層を操作します。

pub mod connect;
pub mod disconnect;
pub mod error;
pub mod gateway;
pub mod join_room;
pub mod leave_room;
pub mod send_message;
#[cfg(test)]
mod testing;

pub use connect::ConnectUseCase;
pub use disconnect::DisconnectUseCase;
pub use error::GatewayError;
pub use gateway::{ConnectionState, RoomGateway};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use send_message::SendMessageUseCase;
