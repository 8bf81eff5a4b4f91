//! Backend environment readiness probes.
//!
//! The UI asks whether the worker environment is usable before offering to
//! launch a job: the backend venv must exist and the credentials file must
//! be present.

use std::path::Path;

use serde::Serialize;
use tokio::fs;

/// Outcome of an environment readiness check.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    /// The backend's Python venv directory exists.
    pub venv_exists: bool,
    /// The credentials/env file exists.
    pub env_file_exists: bool,
    /// Both probes passed.
    pub ready: bool,
}

/// Probe the backend directory and env file.
pub async fn check(backend_dir: &Path, env_file: &Path) -> ReadinessReport {
    let venv_exists = fs::metadata(backend_dir.join("venv")).await.is_ok();
    let env_file_exists = fs::metadata(env_file).await.is_ok();
    ReadinessReport {
        venv_exists,
        env_file_exists,
        ready: venv_exists && env_file_exists,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
