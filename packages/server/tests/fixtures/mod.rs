//! Test fixtures for integration tests.
//!
//! Each test starts its own server on an ephemeral port, so tests can run in
//! parallel without port clashes.

#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use futures_util::{SinkExt, StreamExt};
use hiroba_server::{ServerConfig, ui};
use serde_json::Value;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
    time::timeout,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Server with rooms `room1` and `room2` and users `user1` and `user2`
    pub async fn start() -> Self {
        Self::start_with(ServerConfig {
            rooms: vec!["room1".to_string(), "room2".to_string()],
            users: vec!["user1".to_string(), "user2".to_string()],
            ..ServerConfig::default()
        })
        .await
    }

    pub async fn start_with(config: ServerConfig) -> Self {
        let state = ui::create_app_state(&config).expect("Failed to create app state");
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(ui::serve(listener, ui::create_router(state), async {
            let _ = rx.await;
        }));

        Self {
            addr,
            shutdown: Some(tx),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Open a WebSocket connection and consume its `connected` event
    pub async fn connect(&self) -> WsClient {
        let (mut stream, _) = connect_async(self.ws_url())
            .await
            .expect("Failed to connect WebSocket");
        let connected = recv_json(&mut stream).await;
        assert_eq!(connected["event"], "connected");
        let socket = connected["data"]["socket"]
            .as_str()
            .expect("connected event without socket")
            .to_string();
        WsClient { stream, socket }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// Server-assigned connection id
    pub socket: String,
}

impl WsClient {
    pub async fn send(&mut self, event: Value) {
        self.send_text(event.to_string()).await;
    }

    pub async fn send_text(&mut self, text: String) {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .expect("Failed to send frame");
    }

    pub async fn join(&mut self, room: &str, user: &str) {
        let event = serde_json::json!({
            "event": "joinRoom",
            "data": {
                "chatRoomId": room,
                "time": "2021-06-26T19:00:00",
                "socketWithUser": { "socket": self.socket, "userId": user }
            }
        });
        self.send(event).await;
    }

    pub async fn recv(&mut self) -> Value {
        recv_json(&mut self.stream).await
    }

    /// Wait for the next event named `name`, failing on any other event
    pub async fn expect(&mut self, name: &str) -> Value {
        let event = self.recv().await;
        assert_eq!(event["event"], name, "unexpected event: {event}");
        event["data"].clone()
    }

    /// Assert that nothing arrives within `wait`
    pub async fn expect_silence(&mut self, wait: Duration) {
        if let Ok(Some(frame)) = timeout(wait, self.stream.next()).await {
            panic!("expected no event, got {frame:?}");
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

async fn recv_json(stream: &mut WebSocketStream<MaybeTlsStream<TcpStream>>) -> Value {
    loop {
        let frame = timeout(RECV_TIMEOUT, stream.next())
            .await
            .expect("Timed out waiting for event")
            .expect("Stream closed")
            .expect("WebSocket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("Invalid JSON frame");
        }
    }
}
