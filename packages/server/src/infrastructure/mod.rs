//! Infrastructure layer: wire DTOs, the connection registry and in-memory
//! persistence adapters.

pub mod dto;
pub mod registry;
pub mod repository;

pub use registry::InMemoryConnectionRegistry;
