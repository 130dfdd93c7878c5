//! Server runner: state wiring, router and serve loop.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::{ChatRoom, RoomId, Timestamp, User, UserId},
    error::ServerError,
    infrastructure::{
        InMemoryConnectionRegistry,
        repository::{InMemoryMessageRepository, InMemoryRoomRepository, InMemoryUserRepository},
    },
    ui::{
        handler::{get_room_detail, get_rooms, get_users, health_check, websocket_handler},
        signal::shutdown_signal,
        state::AppState,
    },
};

/// Build the application state, seeding the rooms and users named in `config`.
pub fn create_app_state(config: &ServerConfig) -> Result<Arc<AppState>, ServerError> {
    let now = Timestamp::now();
    let seeded_rooms = config
        .rooms
        .iter()
        .map(|name| -> Result<ChatRoom, ServerError> {
            Ok(ChatRoom::new(RoomId::new(name.clone())?, name.clone(), now))
        })
        .collect::<Result<Vec<_>, ServerError>>()?;
    let seeded_users = config
        .users
        .iter()
        .map(|name| -> Result<User, ServerError> {
            Ok(User {
                id: UserId::new(name.clone())?,
                name: name.clone(),
                email: format!("{name}@hiroba.local"),
            })
        })
        .collect::<Result<Vec<_>, ServerError>>()?;
    tracing::info!(
        "Seeded {} room(s) and {} user(s)",
        seeded_rooms.len(),
        seeded_users.len()
    );

    let rooms = Arc::new(InMemoryRoomRepository::with_rooms(seeded_rooms));
    let users = Arc::new(InMemoryUserRepository::with_users(seeded_users));
    Ok(Arc::new(AppState::new(
        Arc::new(InMemoryConnectionRegistry::new()),
        rooms.clone(),
        Arc::new(InMemoryMessageRepository::new(rooms, users.clone())),
        users,
    )))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(get_rooms))
        .route("/api/rooms/{room_id}", get(get_room_detail))
        .route("/api/users", get(get_users))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let state = create_app_state(&config)?;
    let router = create_router(state);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!("Listening on {}", addr);

    serve(listener, router, shutdown_signal()).await?;
    tracing::info!("Server stopped");
    Ok(())
}
