//! HTTP routes.

use std::sync::Arc;

use axum::{routing::get, Router};

use super::websocket::WsState;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<WsState>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}
