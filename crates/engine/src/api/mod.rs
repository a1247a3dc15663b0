//! API layer - HTTP and WebSocket entry points.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub mod connections;
pub mod http;
pub mod websocket;

pub use connections::ConnectionManager;
pub use websocket::WsState;

/// Full engine router: health routes plus the `/ws` endpoint.
pub fn router(state: Arc<WsState>) -> Router {
    http::routes()
        .route("/ws", get(websocket::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
