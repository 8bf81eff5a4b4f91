//! Worker executable and argument vector resolution.
//!
//! Maps a [`GenerationRequest`] onto the concrete Python invocation for the
//! backend scripts. The only environmental input is a venv-existence check
//! on the backend directory; everything else is a pure function of the
//! request.

use std::path::{Path, PathBuf};

use crate::types::GenerationRequest;

/// Remote-mode worker script, relative to the backend directory.
const REMOTE_SCRIPT: &str = "slideshow.py";

/// Local-mode worker script, relative to the backend directory.
const LOCAL_SCRIPT: &str = "local_slideshow.py";

/// Where the remote-mode worker writes its video when no explicit output
/// path is given, relative to the backend directory.
const DEFAULT_OUTPUT: &str = "output/slideshow.mp4";

/// A fully resolved worker invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    /// Python interpreter to run.
    pub program: PathBuf,
    /// Argument vector, starting with the script path.
    pub args: Vec<String>,
    /// Directory the worker runs in; scripts resolve relative paths here.
    pub working_dir: PathBuf,
    /// Video path reported when the worker never printed an `OUTPUT:` line.
    pub fallback_output: PathBuf,
}

/// Pick the Python interpreter for a backend directory.
///
/// Prefers the backend's own venv when present, falling back to `python3`
/// from `PATH`.
pub fn python_interpreter(backend_dir: &Path) -> PathBuf {
    let venv = backend_dir.join("venv");
    if venv.is_dir() {
        if cfg!(windows) {
            venv.join("Scripts").join("python.exe")
        } else {
            venv.join("bin").join("python")
        }
    } else {
        PathBuf::from("python3")
    }
}

/// Build the worker invocation for a request.
///
/// `--num-images` is omitted entirely when the request leaves the image
/// count to the worker.
pub fn resolve(backend_dir: &Path, request: &GenerationRequest) -> WorkerCommand {
    let program = python_interpreter(backend_dir);

    let (args, fallback_output) = match request {
        GenerationRequest::Remote(params) => {
            let mut args = vec![
                backend_dir.join(REMOTE_SCRIPT).to_string_lossy().into_owned(),
                "--board-url".to_string(),
                params.board_url.clone(),
                "--duration".to_string(),
                params.duration_secs.to_string(),
                "--recency-weight".to_string(),
                params.recency_weight.to_string(),
            ];
            if let Some(n) = params.num_images {
                args.push("--num-images".to_string());
                args.push(n.to_string());
            }
            (args, backend_dir.join(DEFAULT_OUTPUT))
        }
        GenerationRequest::Local(params) => {
            let mut args = vec![
                backend_dir.join(LOCAL_SCRIPT).to_string_lossy().into_owned(),
                "--input-folder".to_string(),
                params.input_folder.clone(),
                "--duration".to_string(),
                params.duration_secs.to_string(),
                "--output".to_string(),
                params.output_path.clone(),
            ];
            if let Some(n) = params.num_images {
                args.push("--num-images".to_string());
                args.push(n.to_string());
            }
            (args, PathBuf::from(&params.output_path))
        }
    };

    WorkerCommand {
        program,
        args,
        working_dir: backend_dir.to_path_buf(),
        fallback_output,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
