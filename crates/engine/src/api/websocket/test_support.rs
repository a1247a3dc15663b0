use std::collections::VecDeque;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

use super::*;

pub(crate) type ClientStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

pub(crate) async fn spawn_ws_server(
    state: Arc<WsState>,
) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let router = crate::api::router(state);

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, handle)
}

/// Raw test client. Server messages may arrive batched, so decoded frames
/// are buffered and handed out one at a time.
pub(crate) struct WsTestClient {
    ws: ClientStream,
    pending: VecDeque<ServerMessage>,
}

impl WsTestClient {
    pub(crate) async fn connect(addr: SocketAddr) -> Self {
        let url = format!("ws://{}/ws", addr);
        let (ws, _resp) = connect_async(url).await.unwrap();
        Self {
            ws,
            pending: VecDeque::new(),
        }
    }

    pub(crate) async fn send(&mut self, msg: &ClientMessage) {
        let json = gambit_shared::encode(msg).unwrap();
        self.ws.send(WsMessage::Text(json)).await.unwrap();
    }

    pub(crate) async fn send_raw(&mut self, text: &str) {
        self.ws.send(WsMessage::Text(text.to_string())).await.unwrap();
    }

    pub(crate) async fn recv(&mut self) -> ServerMessage {
        loop {
            if let Some(msg) = self.pending.pop_front() {
                return msg;
            }
            let text = match self.ws.next().await.unwrap().unwrap() {
                WsMessage::Text(text) => text,
                WsMessage::Binary(bin) => String::from_utf8(bin).unwrap(),
                _ => continue,
            };
            self.pending.extend(decode_batch::<ServerMessage>(&text));
        }
    }

    pub(crate) async fn expect<F>(&mut self, timeout: Duration, mut predicate: F) -> ServerMessage
    where
        F: FnMut(&ServerMessage) -> bool,
    {
        tokio::time::timeout(timeout, async {
            loop {
                let msg = self.recv().await;
                if predicate(&msg) {
                    return msg;
                }
            }
        })
        .await
        .unwrap()
    }

    pub(crate) async fn expect_nothing(&mut self, timeout: Duration) {
        let result = tokio::time::timeout(timeout, self.recv()).await;
        // We only succeed if we timed out without seeing a message.
        assert!(result.is_err(), "unexpected message: {:?}", result);
    }

    pub(crate) async fn close(mut self) {
        self.ws.close(None).await.unwrap();
    }
}
