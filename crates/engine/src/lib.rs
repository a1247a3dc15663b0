//! Gambit Engine library.
//!
//! The reference game server: matches players into two-seat games and
//! relays moves between them over WebSocket.
//!
//! ## Structure
//!
//! - `stores/` - in-memory game registry
//! - `api/` - HTTP and WebSocket entry points
//! - `config` - environment configuration

pub mod api;
pub mod config;
pub mod error;
pub mod stores;

pub use api::{router, ConnectionManager, WsState};
pub use config::EngineConfig;
pub use error::EngineError;
pub use stores::GameRegistry;
