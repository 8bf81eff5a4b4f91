//! Job identifiers, generation parameters, statuses, and results.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Opaque handle identifying one run of the worker, minted at launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Mint a fresh job id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Image source for a generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Images fetched from a remote board by URL.
    Remote,
    /// Images read from a local folder.
    Local,
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Parameters for a remote-board generation job.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RemoteParams {
    /// Board URL or bare board id.
    #[validate(length(min = 1, message = "board URL must not be empty"))]
    pub board_url: String,

    /// Target video duration in seconds.
    #[serde(default = "default_duration_secs")]
    #[validate(range(min = 1, max = 3600))]
    pub duration_secs: u32,

    /// Weight given to recent pins when ranking images (0.0–1.0).
    #[serde(default = "default_recency_weight")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub recency_weight: f64,

    /// Number of images to include; `None` lets the worker choose.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub num_images: Option<u32>,
}

/// Parameters for a local-folder generation job.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LocalParams {
    /// Folder containing the source images.
    #[validate(length(min = 1, message = "input folder must not be empty"))]
    pub input_folder: String,

    /// Target video duration in seconds.
    #[serde(default = "default_duration_secs")]
    #[validate(range(min = 1, max = 3600))]
    pub duration_secs: u32,

    /// Where the worker writes the finished video.
    #[validate(length(min = 1, message = "output path must not be empty"))]
    pub output_path: String,

    /// Number of images to include; `None` lets the worker choose.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub num_images: Option<u32>,
}

fn default_duration_secs() -> u32 {
    60
}

fn default_recency_weight() -> f64 {
    0.7
}

/// A request to launch one generation job, tagged by mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum GenerationRequest {
    Remote(RemoteParams),
    Local(LocalParams),
}

impl GenerationRequest {
    /// The image source this request targets.
    pub fn mode(&self) -> GenerationMode {
        match self {
            Self::Remote(_) => GenerationMode::Remote,
            Self::Local(_) => GenerationMode::Local,
        }
    }

    /// Validate the mode-specific parameters.
    pub fn validate(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            Self::Remote(params) => params.validate(),
            Self::Local(params) => params.validate(),
        }
    }
}

/// Lifecycle state of the single job slot.
///
/// Transitions are monotonic: `Idle → Running → {Completed, Failed}` and
/// `Running → Cancelling → Cancelled`. The slot returns to `Idle` only
/// after the terminal result has been published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Idle,
    Running,
    Cancelling,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Whether a job in this state still holds the slot.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Cancelling)
    }

    /// Whether this state admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Cancelling => "cancelling",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// Fixed message reported on successful completion.
const SUCCESS_MESSAGE: &str = "Slideshow generated successfully!";

/// Generic failure message used when the worker produced no stderr.
const GENERIC_FAILURE: &str = "worker process failed";

/// Terminal outcome of one generation job.
///
/// `video_path` is `Some` if and only if `success` is true.
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub success: bool,
    pub video_path: Option<String>,
    pub message: String,
    pub exit_code: Option<i32>,
    pub error: Option<String>,
}

impl JobResult {
    /// Result for a worker that exited zero. `video_path` is the last
    /// `OUTPUT:` path observed, or the mode's fallback location.
    pub fn completed(video_path: String) -> Self {
        Self {
            success: true,
            video_path: Some(video_path),
            message: SUCCESS_MESSAGE.to_string(),
            exit_code: Some(0),
            error: None,
        }
    }

    /// Result for a worker that exited nonzero (or was killed by a signal,
    /// in which case `exit_code` is `None`). Stderr becomes the error text
    /// when non-empty.
    pub fn failed(exit_code: Option<i32>, stderr: &str) -> Self {
        let stderr = stderr.trim();
        let error = if stderr.is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            stderr.to_string()
        };
        Self {
            success: false,
            video_path: None,
            message: error.clone(),
            exit_code,
            error: Some(error),
        }
    }

    /// Result for a job cancelled by the user, irrespective of how the
    /// worker actually exited.
    pub fn cancelled() -> Self {
        Self {
            success: false,
            video_path: None,
            message: "Generation cancelled".to_string(),
            exit_code: None,
            error: Some("cancelled".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_params_validate_recency_weight_range() {
        let mut params = RemoteParams {
            board_url: "https://example.com/board/123".to_string(),
            duration_secs: 60,
            recency_weight: 0.7,
            num_images: None,
        };
        assert!(params.validate().is_ok());

        params.recency_weight = 1.2;
        assert!(params.validate().is_err());
    }

    #[test]
    fn remote_params_reject_empty_board_url() {
        let params = RemoteParams {
            board_url: String::new(),
            duration_secs: 60,
            recency_weight: 0.5,
            num_images: None,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn local_params_reject_zero_duration() {
        let params = LocalParams {
            input_folder: "/tmp/photos".to_string(),
            duration_secs: 0,
            output_path: "/tmp/out.mp4".to_string(),
            num_images: None,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn request_deserializes_with_mode_tag_and_defaults() {
        let request: GenerationRequest = serde_json::from_str(
            r#"{"mode": "remote", "board_url": "https://example.com/b/1"}"#,
        )
        .expect("valid request");

        assert_eq!(request.mode(), GenerationMode::Remote);
        match request {
            GenerationRequest::Remote(p) => {
                assert_eq!(p.duration_secs, 60);
                assert!((p.recency_weight - 0.7).abs() < f64::EPSILON);
                assert!(p.num_images.is_none());
            }
            GenerationRequest::Local(_) => panic!("expected remote request"),
        }
    }

    #[test]
    fn request_validate_dispatches_to_params() {
        let request = GenerationRequest::Local(LocalParams {
            input_folder: String::new(),
            duration_secs: 60,
            output_path: "/tmp/out.mp4".to_string(),
            num_images: None,
        });
        assert!(request.validate().is_err());
    }

    #[test]
    fn status_classification() {
        assert!(JobStatus::Running.is_active());
        assert!(JobStatus::Cancelling.is_active());
        assert!(!JobStatus::Idle.is_active());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn completed_result_carries_video_path() {
        let result = JobResult::completed("/tmp/x.mp4".to_string());
        assert!(result.success);
        assert_eq!(result.video_path.as_deref(), Some("/tmp/x.mp4"));
        assert_eq!(result.exit_code, Some(0));
        assert!(result.error.is_none());
    }

    #[test]
    fn failed_result_uses_stderr_when_present() {
        let result = JobResult::failed(Some(1), "boom\n");
        assert!(!result.success);
        assert!(result.video_path.is_none());
        assert_eq!(result.exit_code, Some(1));
        assert_eq!(result.error.as_deref(), Some("boom"));
    }

    #[test]
    fn failed_result_falls_back_to_generic_message() {
        let result = JobResult::failed(Some(2), "   ");
        assert_eq!(result.error.as_deref(), Some("worker process failed"));
    }

    #[test]
    fn cancelled_result_is_marked() {
        let result = JobResult::cancelled();
        assert!(!result.success);
        assert!(result.video_path.is_none());
        assert_eq!(result.error.as_deref(), Some("cancelled"));
    }
}
