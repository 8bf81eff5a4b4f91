use std::sync::Arc;

use boardreel_supervisor::JobSupervisor;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; all inner data is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Daemon configuration.
    pub config: Arc<ServerConfig>,
    /// The single-slot job supervisor.
    pub supervisor: Arc<JobSupervisor>,
    /// WebSocket connection manager (UI clients).
    pub ws_manager: Arc<WsManager>,
}
