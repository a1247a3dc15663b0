//! What the transport tells the session, and how the session steers it.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::oneshot;

/// Where the client is in its connect/reconnect cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Waiting out a backoff delay before the next attempt
    Reconnecting,
    /// Gave up after the last allowed attempt
    Failed,
}

impl ConnectionState {
    pub fn to_u8(self) -> u8 {
        match self {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Connected => 2,
            ConnectionState::Reconnecting => 3,
            ConnectionState::Failed => 4,
        }
    }

    /// Bytes outside the known range read as `Disconnected`.
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Reconnecting,
            4 => ConnectionState::Failed,
            _ => ConnectionState::Disconnected,
        }
    }

    fn load(cell: &AtomicU8) -> Self {
        Self::from_u8(cell.load(Ordering::SeqCst))
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Failed => "failed",
        })
    }
}

/// What the transport reports to the session, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// A connection (first or re-established) is open
    Opened,
    /// One transport message; may hold several newline-separated frames
    Frame(String),
    /// The connection closed with this status code
    Closed { code: u16 },
}

/// Owner's grip on a running connection task.
///
/// Dropping it leaves the connection alone; only [`disconnect`] stops it.
///
/// [`disconnect`]: ConnectionHandle::disconnect
pub struct ConnectionHandle {
    state: Arc<AtomicU8>,
    disconnect_tx: oneshot::Sender<()>,
}

impl ConnectionHandle {
    pub fn new(state: Arc<AtomicU8>, disconnect_tx: oneshot::Sender<()>) -> Self {
        Self {
            state,
            disconnect_tx,
        }
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::load(&self.state)
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Close with status 1000 and stop reconnecting. Returns before the
    /// socket is closed; the event stream reports the close.
    pub fn disconnect(self) {
        let _ = self.disconnect_tx.send(());
    }
}

/// Read-only view of the connection state, for status displays.
#[derive(Clone)]
pub struct ConnectionStateObserver {
    state: Arc<AtomicU8>,
}

impl ConnectionStateObserver {
    pub fn new(state: Arc<AtomicU8>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::load(&self.state)
    }
}

pub fn set_connection_state(state_ref: &AtomicU8, new_state: ConnectionState) {
    state_ref.store(new_state.to_u8(), Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_state_byte_reads_as_disconnected() {
        assert_eq!(ConnectionState::from_u8(200), ConnectionState::Disconnected);
        assert_eq!(
            ConnectionState::from_u8(ConnectionState::Failed.to_u8()),
            ConnectionState::Failed
        );
    }

    #[test]
    fn handle_and_observer_share_one_state() {
        let state = Arc::new(AtomicU8::new(ConnectionState::Disconnected.to_u8()));
        let (tx, mut rx) = oneshot::channel();
        let handle = ConnectionHandle::new(Arc::clone(&state), tx);
        let observer = ConnectionStateObserver::new(Arc::clone(&state));

        set_connection_state(&state, ConnectionState::Reconnecting);
        assert_eq!(observer.state(), ConnectionState::Reconnecting);
        assert_eq!(observer.state().to_string(), "reconnecting");
        assert!(!handle.is_connected());

        handle.disconnect();
        assert_eq!(rx.try_recv(), Ok(()));
    }
}
