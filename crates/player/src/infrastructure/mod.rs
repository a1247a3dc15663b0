pub mod messaging;
pub mod storage;
pub mod terminal;
pub mod view;
pub mod websocket;

pub mod testing;

// Re-export messaging types
pub use messaging::{ConnectionEvent, ConnectionState};
