//! Bridges the job event bus onto WebSocket clients.
//!
//! Every [`JobEvent`] published by the supervisor is serialized as a JSON
//! object tagged by `type` and broadcast to all connected clients. The
//! forwarder never blocks the supervisor: if it falls behind the bus it
//! observes `Lagged`, logs the gap, and keeps going.

use std::sync::Arc;

use axum::extract::ws::Message;
use boardreel_events::JobEvent;
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Forward job events to WebSocket clients until the bus closes.
pub async fn forward_job_events(
    ws_manager: Arc<WsManager>,
    mut rx: broadcast::Receiver<JobEvent>,
) {
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(payload) => {
                    ws_manager.broadcast(Message::Text(payload.into())).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize job event");
                }
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "WebSocket forwarder lagged behind the event bus");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    tracing::debug!("Job event bus closed, forwarder exiting");
}
