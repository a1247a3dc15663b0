//! WebSocket client for the engine connection
//!
//! - `client`: tokio-tungstenite based client with automatic reconnection
//! - `core`: runtime-free backoff math
//! - `shared`: reconnection constants and close-code classification

mod client;
mod core;
mod shared;

pub use client::{ConnectionError, GameClient};
pub use self::core::{BackoffState, ReconnectPolicy};
pub use shared::{
    ABNORMAL_CLOSURE, INITIAL_RETRY_DELAY_MS, MAX_RETRY_ATTEMPTS, MAX_RETRY_DELAY_MS,
    NO_STATUS_RECEIVED,
};
