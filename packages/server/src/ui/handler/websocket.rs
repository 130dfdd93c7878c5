//! WebSocket connection handlers.
//!
//! One reader loop and one writer task per connection. The reader decodes
//! each text frame into a [`ClientEvent`] and hands it to the Room Gateway in
//! arrival order; the writer drains the connection's outbound channel.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{
        ConnectionId, ConnectionIdFactory, MessageSubmission, RoomId, UserId, ValueObjectError,
    },
    infrastructure::dto::websocket::{ClientEvent, JoinRoomPayload, decode_client_event},
    ui::state::AppState,
    usecase::{GatewayError, RoomGateway},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, StatusCode> {
    let connection_id = ConnectionIdFactory::generate().map_err(|e| {
        tracing::error!("Failed to generate connection id: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    let (mut sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive events
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    state.gateway.connect(&connection_id, tx);

    // Spawn a task to forward events from the gateway to this connection
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    // Spawn a task to receive events from this connection
    let recv_state = state.clone();
    let recv_connection_id = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", recv_connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from '{}': {}", recv_connection_id, text.as_str());
                    dispatch(&recv_state.gateway, &recv_connection_id, text.as_str()).await;
                }
                Message::Binary(_) => {
                    recv_state.gateway.reject(
                        &recv_connection_id,
                        GatewayError::InvalidEvent("binary frame".to_string()),
                    );
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", recv_connection_id);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    tracing::debug!(
        "Connection '{}' closing in state {:?}",
        connection_id,
        state.gateway.state(&connection_id)
    );
    state.gateway.disconnect(&connection_id);
}

/// Decode one text frame and run the matching gateway transition.
///
/// Failures have already been reported to the connection by the gateway.
pub async fn dispatch(gateway: &RoomGateway, connection_id: &ConnectionId, text: &str) {
    let event = match decode_client_event(text) {
        Ok(event) => event,
        Err(e) => {
            gateway.reject(connection_id, GatewayError::InvalidEvent(e.to_string()));
            return;
        }
    };

    match event {
        ClientEvent::JoinRoom(payload) => {
            let (room_id, user_id) = match join_target(connection_id, payload) {
                Ok(target) => target,
                Err(e) => {
                    gateway.reject(connection_id, e);
                    return;
                }
            };
            if let Err(e) = gateway.join_room(connection_id, &room_id, user_id).await {
                tracing::trace!("joinRoom from '{}' failed: {}", connection_id, e);
            }
        }
        ClientEvent::Message(payload) => match MessageSubmission::try_from(payload) {
            Ok(submission) => {
                if let Err(e) = gateway.send_message(connection_id, submission).await {
                    tracing::trace!("message from '{}' failed: {}", connection_id, e);
                }
            }
            Err(e) => gateway.reject(connection_id, e.into()),
        },
        ClientEvent::LeaveRoom(payload) => {
            gateway.leave_room(connection_id, payload.room.as_deref());
        }
    }
}

fn join_target(
    connection_id: &ConnectionId,
    payload: JoinRoomPayload,
) -> Result<(RoomId, UserId), GatewayError> {
    let claimed = &payload.socket_with_user.socket;
    if claimed != connection_id.as_str() {
        tracing::debug!(
            "Connection '{}' joined claiming socket '{}'; using the server-assigned id",
            connection_id,
            claimed
        );
    }
    let invalid = |e: ValueObjectError| GatewayError::InvalidEvent(e.to_string());
    Ok((
        RoomId::new(payload.chat_room_id).map_err(invalid)?,
        UserId::new(payload.socket_with_user.user_id).map_err(invalid)?,
    ))
}
