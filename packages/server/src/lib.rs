//! Realtime chat room server.
//!
//! Tracks which WebSocket connections are present in which chat room and fans
//! out presence events and messages to the right subset of connections.
//!
//! Layers:
//! - [`domain`]: value objects, entities, the Room Membership Index and ports
//! - [`usecase`]: one use case per connection transition, and the Room Gateway
//! - [`infrastructure`]: wire DTOs, the Connection Registry, in-memory stores
//! - [`ui`]: axum router, WebSocket and HTTP handlers, server runner

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub use config::ServerConfig;
pub use error::ServerError;
pub use ui::run;
