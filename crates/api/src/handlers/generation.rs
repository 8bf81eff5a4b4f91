//! Handlers for the generation job slot.
//!
//! Routes:
//! - `POST /api/v1/generation`        — launch a job
//! - `POST /api/v1/generation/cancel` — request cancellation
//! - `GET  /api/v1/generation/status` — current slot state

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use boardreel_core::types::{GenerationRequest, JobId, JobStatus};
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LaunchResponse {
    pub job_id: JobId,
    pub status: JobStatus,
}

/// POST /api/v1/generation
///
/// Launches a generation job and returns 202 immediately; the outcome
/// arrives over the WebSocket as a `job_finished` event. 409 when a job is
/// already active, 400 on invalid parameters, 500 when the worker cannot
/// be spawned.
pub async fn launch(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> AppResult<impl IntoResponse> {
    let job_id = state.supervisor.launch(request).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: LaunchResponse {
                job_id,
                status: JobStatus::Running,
            },
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub success: bool,
}

/// POST /api/v1/generation/cancel
///
/// Requests cancellation of the active job. `success: false` means no job
/// was running; that is a normal response, not an error.
pub async fn cancel(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let success = state.supervisor.cancel().await;
    Ok(Json(DataResponse {
        data: CancelResponse { success },
    }))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: JobStatus,
}

/// GET /api/v1/generation/status
pub async fn status(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let status = state.supervisor.status().await;
    Ok(Json(DataResponse {
        data: StatusResponse { status },
    }))
}
