//! WebSocket client using tokio-tungstenite

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, Notify};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message};

use super::core::{BackoffState, ReconnectPolicy};
use super::shared::{
    ABNORMAL_CLOSURE, EVENT_QUEUE_CAPACITY, NO_STATUS_RECEIVED, OUTBOUND_QUEUE_CAPACITY,
};
use crate::application::session::{is_clean_close, NORMAL_CLOSURE};
use crate::infrastructure::messaging::{
    set_connection_state, ConnectionEvent, ConnectionHandle, ConnectionState,
    ConnectionStateObserver,
};
use crate::ports::outbound::FrameSink;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("not connected")]
    NotConnected,
    #[error("outbound queue is full")]
    QueueFull,
    #[error("outbound channel closed")]
    ChannelClosed,
    #[error("websocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),
}

impl From<tungstenite::Error> for ConnectionError {
    fn from(e: tungstenite::Error) -> Self {
        ConnectionError::WebSocket(Box::new(e))
    }
}

/// WebSocket client for the engine.
///
/// Holds at most one open socket. Abnormal closes and failed connects are
/// retried with exponential backoff; a clean close or an explicit disconnect
/// ends the connection task and with it the event stream.
#[derive(Clone)]
pub struct GameClient {
    url: String,
    policy: ReconnectPolicy,
    state: Arc<AtomicU8>,
    tx: Arc<Mutex<Option<mpsc::Sender<String>>>>,
    /// Flag to track if disconnect was intentional (vs unexpected close)
    intentional_disconnect: Arc<AtomicBool>,
    /// Wakes a pending backoff sleep on disconnect
    shutdown: Arc<Notify>,
}

impl GameClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            policy: ReconnectPolicy::default(),
            state: Arc::new(AtomicU8::new(ConnectionState::Disconnected.to_u8())),
            tx: Arc::new(Mutex::new(None)),
            intentional_disconnect: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn with_reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn observer(&self) -> ConnectionStateObserver {
        ConnectionStateObserver::new(Arc::clone(&self.state))
    }

    /// Spawn the connection task.
    ///
    /// Returns the lifecycle handle and the stream of connection events. The
    /// stream ends once the task stops: after a clean close, an explicit
    /// disconnect, or when reconnection gives up.
    pub fn connect(&self) -> (ConnectionHandle, mpsc::Receiver<ConnectionEvent>) {
        self.intentional_disconnect.store(false, Ordering::SeqCst);

        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let (disconnect_tx, disconnect_rx) = oneshot::channel::<()>();

        let watcher = self.clone();
        tokio::spawn(async move {
            // Err means the handle was dropped without asking to disconnect.
            if disconnect_rx.await.is_ok() {
                watcher.disconnect();
            }
        });

        let client = self.clone();
        tokio::spawn(async move {
            client.run(events_tx).await;
        });

        (
            ConnectionHandle::new(Arc::clone(&self.state), disconnect_tx),
            events_rx,
        )
    }

    /// Queue one encoded frame on the open socket.
    pub fn send(&self, frame: String) -> Result<(), ConnectionError> {
        let tx = self.sender().ok_or(ConnectionError::NotConnected)?;
        tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => ConnectionError::QueueFull,
            TrySendError::Closed(_) => ConnectionError::ChannelClosed,
        })
    }

    /// Close the socket with status 1000 and stop reconnecting.
    pub fn disconnect(&self) {
        tracing::info!(url = %self.url, "Disconnect requested");
        self.intentional_disconnect.store(true, Ordering::SeqCst);
        // Dropping the sender ends the writer, which sends the close frame.
        self.install_sender(None);
        self.shutdown.notify_one();
    }

    fn is_intentional(&self) -> bool {
        self.intentional_disconnect.load(Ordering::SeqCst)
    }

    fn set_state(&self, new_state: ConnectionState) {
        set_connection_state(&self.state, new_state);
    }

    fn sender(&self) -> Option<mpsc::Sender<String>> {
        match self.tx.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn install_sender(&self, sender: Option<mpsc::Sender<String>>) {
        match self.tx.lock() {
            Ok(mut guard) => *guard = sender,
            Err(poisoned) => *poisoned.into_inner() = sender,
        }
    }

    /// Connect, and keep reconnecting after abnormal closes.
    async fn run(&self, events: mpsc::Sender<ConnectionEvent>) {
        let mut backoff = BackoffState::new(self.policy);

        loop {
            match self.connect_internal(&events).await {
                Ok(code) => {
                    backoff.reset();
                    if is_clean_close(code) || self.is_intentional() {
                        tracing::info!(code, "Connection closed, not reconnecting");
                        self.set_state(ConnectionState::Disconnected);
                        return;
                    }
                    tracing::info!(code, "Connection closed unexpectedly, initiating reconnection");
                }
                Err(e) => {
                    tracing::warn!(
                        url = %self.url,
                        attempt = backoff.attempts(),
                        error = %e,
                        "Failed to connect to engine"
                    );
                }
            }

            if events.is_closed() {
                tracing::debug!("Connection events no longer observed, stopping");
                self.set_state(ConnectionState::Disconnected);
                return;
            }

            self.set_state(ConnectionState::Reconnecting);
            let Some(delay) = backoff.next_delay_and_advance() else {
                tracing::error!("Max reconnection attempts reached, giving up");
                self.set_state(ConnectionState::Failed);
                return;
            };
            tracing::info!(
                attempt = backoff.attempts(),
                max_attempts = backoff.max_attempts(),
                delay_ms = delay.as_millis() as u64,
                "Scheduling reconnection"
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.shutdown.notified() => {}
            }

            // Check if disconnect was requested during the wait
            if self.is_intentional() {
                tracing::info!("Reconnection cancelled - intentional disconnect");
                self.set_state(ConnectionState::Disconnected);
                return;
            }
        }
    }

    /// One connection from handshake to close. Returns the close code.
    async fn connect_internal(
        &self,
        events: &mpsc::Sender<ConnectionEvent>,
    ) -> Result<u16, ConnectionError> {
        self.set_state(ConnectionState::Connecting);

        let (ws_stream, _) = match connect_async(self.url.as_str()).await {
            Ok(connected) => connected,
            Err(e) => {
                self.set_state(ConnectionState::Disconnected);
                return Err(e.into());
            }
        };
        tracing::info!(url = %self.url, "Connected to engine");
        self.set_state(ConnectionState::Connected);

        let (mut write, mut read) = ws_stream.split();
        let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE_CAPACITY);
        self.install_sender(Some(tx));
        if self.is_intentional() {
            // Disconnect raced the handshake.
            self.install_sender(None);
        }

        if events.send(ConnectionEvent::Opened).await.is_err() {
            tracing::debug!("Event receiver dropped, open not reported");
        }

        let reader_events = events.clone();
        let mut read_handle = tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if reader_events.send(ConnectionEvent::Frame(text)).await.is_err() {
                            tracing::debug!("Event receiver dropped, stopping reader");
                            return NORMAL_CLOSURE;
                        }
                    }
                    Ok(Message::Close(frame)) => {
                        let code = frame
                            .map(|f| u16::from(f.code))
                            .unwrap_or(NO_STATUS_RECEIVED);
                        tracing::info!(code, "Server closed connection");
                        return code;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "WebSocket error");
                        return ABNORMAL_CLOSURE;
                    }
                }
            }
            ABNORMAL_CLOSURE
        });

        let mut write_handle = tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                if let Err(e) = write.send(Message::Text(frame)).await {
                    tracing::error!(error = %e, "Failed to send frame");
                    return;
                }
            }
            let close = CloseFrame {
                code: CloseCode::Normal,
                reason: "".into(),
            };
            if let Err(e) = write.send(Message::Close(Some(close))).await {
                tracing::debug!(error = %e, "Failed to send close frame");
            }
        });

        let code = tokio::select! {
            result = &mut read_handle => {
                write_handle.abort();
                result.unwrap_or(ABNORMAL_CLOSURE)
            }
            _ = &mut write_handle => {
                read_handle.abort();
                if self.is_intentional() { NORMAL_CLOSURE } else { ABNORMAL_CLOSURE }
            }
        };

        self.install_sender(None);
        self.set_state(ConnectionState::Disconnected);
        if events.send(ConnectionEvent::Closed { code }).await.is_err() {
            tracing::debug!(code, "Event receiver dropped, close not reported");
        }

        Ok(code)
    }
}

impl FrameSink for GameClient {
    fn send_frame(&self, frame: String) -> anyhow::Result<()> {
        Ok(self.send(frame)?)
    }
}
