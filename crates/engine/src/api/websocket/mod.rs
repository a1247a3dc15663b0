//! WebSocket handling for Player connections.
//!
//! One reader loop and one writer task per socket. The reader decodes each
//! text message as a newline-delimited batch of client frames; the writer
//! drains its queue and joins whatever is pending into one text message.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use gambit_shared::{decode_batch, encode_batch, ClientMessage, ServerMessage};

use super::connections::ConnectionManager;
use crate::stores::{ConnectionId, Delivery, GameRegistry};

mod ws_game;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod ws_integration_tests;

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// How long a closing socket may spend flushing its queue.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Combined state for WebSocket handlers.
pub struct WsState {
    pub games: Arc<GameRegistry>,
    pub connections: Arc<ConnectionManager>,
}

impl WsState {
    pub fn new() -> Self {
        Self {
            games: Arc::new(GameRegistry::new()),
            connections: Arc::new(ConnectionManager::new()),
        }
    }
}

impl Default for WsState {
    fn default() -> Self {
        Self::new()
    }
}

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = Uuid::new_v4();

    // Create a bounded channel for sending messages to this client
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);
    state.connections.register(connection_id, tx);

    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    // Forward queued messages, batching whatever is already waiting
    let mut send_task = tokio::spawn(async move {
        while let Some(first) = rx.recv().await {
            let mut batch = vec![first];
            while let Ok(next) = rx.try_recv() {
                batch.push(next);
            }
            let text = match encode_batch(&batch) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(
                        connection_id = %connection_id,
                        error = %e,
                        "Failed to encode batch"
                    );
                    continue;
                }
            };
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                for msg in decode_batch::<ClientMessage>(text.as_str()) {
                    let deliveries = handle_message(msg, &state, connection_id).await;
                    state.connections.deliver(deliveries);
                }
            }
            Ok(Message::Close(frame)) => {
                tracing::info!(
                    connection_id = %connection_id,
                    code = frame.as_ref().map(|f| u16::from(f.code)),
                    "WebSocket closed by client"
                );
                break;
            }
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    // Clean up: the opponent hears about it before this socket's queue goes away
    let deliveries = state.games.disconnect(connection_id).await;
    state.connections.unregister(connection_id);
    state.connections.deliver(deliveries);

    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut send_task)
        .await
        .is_err()
    {
        send_task.abort();
    }

    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}

/// Dispatch a decoded client message to the game handlers.
async fn handle_message(
    msg: ClientMessage,
    state: &WsState,
    connection_id: ConnectionId,
) -> Vec<Delivery> {
    tracing::debug!(connection_id = %connection_id, kind = msg.kind(), "Client message received");

    match msg {
        ClientMessage::FindGame(data) => {
            ws_game::handle_find_game(state, connection_id, data).await
        }
        ClientMessage::GetGame(data) => ws_game::handle_get_game(state, connection_id, data).await,
        ClientMessage::MakeMove(data) => {
            ws_game::handle_make_move(state, connection_id, data).await
        }
        ClientMessage::LeaveGame(data) => {
            ws_game::handle_leave_game(state, connection_id, data).await
        }
        ClientMessage::Unknown { kind } => {
            tracing::warn!(connection_id = %connection_id, %kind, "Unknown message type");
            Vec::new()
        }
    }
}
