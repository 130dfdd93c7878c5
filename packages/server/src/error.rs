//! Errors that stop the server.
//!
//! Per-connection failures never end up here; they are reported to the
//! client as `error` events (see [`crate::usecase::GatewayError`]).

use thiserror::Error;

use crate::domain::ValueObjectError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid seed data: {0}")]
    InvalidSeed(#[from] ValueObjectError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
