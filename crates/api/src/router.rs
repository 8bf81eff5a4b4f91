//! Route table for the daemon.

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::handlers::{generation, readiness};
use crate::state::AppState;
use crate::ws;

/// Routes nested under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/generation", post(generation::launch))
        .route("/generation/cancel", post(generation::cancel))
        .route("/generation/status", get(generation::status))
        .route("/readiness", get(readiness::check))
}

/// Root-level routes: liveness and the WebSocket upgrade.
pub fn root_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws::ws_handler))
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
