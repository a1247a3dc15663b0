//! Connection lifecycle types shared between the WebSocket client and the
//! session driver.
//!
//! - `ConnectionEvent`: what the transport reports (open, frames, close)
//! - `ConnectionHandle`: stop the connection task
//! - `ConnectionStateObserver`: read the state without owning the handle

pub mod connection;

pub use connection::{
    set_connection_state, ConnectionEvent, ConnectionHandle, ConnectionState,
    ConnectionStateObserver,
};
