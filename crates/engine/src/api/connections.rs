//! Connection management for WebSocket clients.
//!
//! Tracks the outbound queue of every open socket so registry results can be
//! routed to the right client.

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use gambit_shared::ServerMessage;

use crate::error::EngineError;
use crate::stores::Delivery;

/// Manages all active WebSocket connections.
pub struct ConnectionManager {
    /// Map of connection_id -> sender channel
    connections: DashMap<Uuid, mpsc::Sender<ServerMessage>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a new connection.
    pub fn register(&self, connection_id: Uuid, sender: mpsc::Sender<ServerMessage>) {
        self.connections.insert(connection_id, sender);
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Unregister a connection.
    pub fn unregister(&self, connection_id: Uuid) {
        if self.connections.remove(&connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    /// Queue one message for one connection without waiting.
    pub fn send_to(&self, connection_id: Uuid, message: ServerMessage) -> Result<(), EngineError> {
        let sender = self
            .connections
            .get(&connection_id)
            .ok_or(EngineError::UnknownConnection(connection_id))?;
        sender.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => EngineError::ConnectionBackpressure(connection_id),
            TrySendError::Closed(_) => EngineError::UnknownConnection(connection_id),
        })
    }

    /// Route registry output. Undeliverable messages are logged and dropped.
    pub fn deliver(&self, deliveries: Vec<Delivery>) {
        for (connection_id, message) in deliveries {
            let kind = message.kind().to_string();
            if let Err(e) = self.send_to(connection_id, message) {
                tracing::warn!(
                    connection_id = %connection_id,
                    kind = %kind,
                    error = %e,
                    "Failed to deliver message"
                );
            }
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
