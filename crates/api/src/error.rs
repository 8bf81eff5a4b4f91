use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use boardreel_supervisor::LaunchError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent `{ "error", "code" }`
/// JSON bodies. The distinction the UI relies on: launch-time failures are
/// synchronous HTTP errors here, while worker failures and cancellations
/// arrive asynchronously as terminal events over the WebSocket.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A synchronous launch failure from the supervisor.
    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Launch(launch) => match launch {
                LaunchError::Conflict => (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    "A generation job is already running".to_string(),
                ),
                LaunchError::Validation(errors) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", errors.to_string())
                }
                LaunchError::Spawn(e) => {
                    tracing::error!(error = %e, "Failed to spawn generation worker");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "SPAWN_FAILED",
                        "Failed to start the generation worker".to_string(),
                    )
                }
            },
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
