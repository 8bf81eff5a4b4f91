//! Backend environment readiness endpoint.
//!
//! The UI calls this before offering to launch a job, mirroring the
//! worker-setup checks it shows in its settings panel.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use boardreel_core::readiness;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/readiness
pub async fn check(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let report = readiness::check(&state.config.backend_dir, &state.config.env_file).await;
    Ok(Json(DataResponse { data: report }))
}
