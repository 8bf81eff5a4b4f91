//! The job supervisor: launch, monitor, and cancel the generation worker.
//!
//! Exactly one job may occupy the slot at a time; a second launch is
//! rejected rather than queued. All slot mutations are serialized through a
//! single async mutex, so exit handling and cancellation never race. The
//! monitor task is the only owner of the child process handle.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;

use boardreel_core::protocol::{LineProtocolParser, ProtocolEvent};
use boardreel_core::resolver::{self, WorkerCommand};
use boardreel_core::types::{GenerationRequest, JobId, JobResult, JobStatus};
use boardreel_events::{JobEvent, JobEventBus};

/// Maximum stderr capture per job (1 MiB).
///
/// Stderr beyond this limit is truncated to prevent memory exhaustion from
/// an extremely verbose worker.
const MAX_STDERR_BYTES: usize = 1024 * 1024;

/// Read buffer size for stdout chunks.
const CHUNK_SIZE: usize = 4096;

/// Errors surfaced synchronously by [`JobSupervisor::launch`].
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// A job is already occupying the slot. Queueing is deliberately
    /// unsupported; the caller may retry after the current job finishes.
    #[error("a generation job is already running")]
    Conflict,

    /// The request parameters failed validation; nothing was started.
    #[error("invalid generation parameters: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The OS could not create the worker process (missing binary,
    /// permissions, resource exhaustion). The slot remains idle.
    #[error("failed to spawn worker process: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Bookkeeping for the job currently occupying the slot.
///
/// `status` is only ever `Running` or `Cancelling` here; terminal states
/// are reported on the bus and free the slot.
struct ActiveJob {
    id: JobId,
    status: JobStatus,
    cancel: CancellationToken,
}

/// Owns the single active job slot and the worker process behind it.
///
/// Created once at startup; the returned `Arc` is cheap to clone into
/// request handlers.
pub struct JobSupervisor {
    /// Directory holding the worker scripts (and optionally their venv).
    backend_dir: PathBuf,
    bus: Arc<JobEventBus>,
    slot: Mutex<Option<ActiveJob>>,
}

impl JobSupervisor {
    pub fn new(backend_dir: impl Into<PathBuf>, bus: Arc<JobEventBus>) -> Arc<Self> {
        Arc::new(Self {
            backend_dir: backend_dir.into(),
            bus,
            slot: Mutex::new(None),
        })
    }

    /// Subscribe to the progress, status, and terminal events of jobs run
    /// by this supervisor.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.bus.subscribe()
    }

    /// Current state of the slot; `Idle` when no job is active.
    pub async fn status(&self) -> JobStatus {
        match self.slot.lock().await.as_ref() {
            Some(job) => job.status,
            None => JobStatus::Idle,
        }
    }

    /// Validate a request, resolve the worker invocation, and launch it.
    ///
    /// Returns the job id immediately; the eventual outcome is delivered
    /// asynchronously as a [`JobEvent::JobFinished`] on the bus.
    pub async fn launch(self: &Arc<Self>, request: GenerationRequest) -> Result<JobId, LaunchError> {
        request.validate()?;
        let command = resolver::resolve(&self.backend_dir, &request);
        tracing::info!(mode = %request.mode(), program = %command.program.display(), "Launching generation job");
        self.spawn_worker(command).await
    }

    /// Lower-level entry point taking an already resolved invocation.
    pub async fn spawn_worker(
        self: &Arc<Self>,
        command: WorkerCommand,
    ) -> Result<JobId, LaunchError> {
        let mut slot = self.slot.lock().await;
        if slot.is_some() {
            return Err(LaunchError::Conflict);
        }

        // `kill_on_drop(true)` is the backstop for daemon shutdown; normal
        // cancellation goes through the token below.
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let id = JobId::new();
        let cancel = CancellationToken::new();
        let pid = child.id();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        *slot = Some(ActiveJob {
            id,
            status: JobStatus::Running,
            cancel: cancel.clone(),
        });
        drop(slot);

        tracing::info!(job_id = %id, pid, "Worker process spawned");

        let supervisor = Arc::clone(self);
        tokio::spawn(async move {
            supervisor
                .monitor(id, child, stdout, stderr, command.fallback_output, cancel)
                .await;
        });

        Ok(id)
    }

    /// Request cancellation of the active job.
    ///
    /// Returns `false` when no job is running. Returns `true` immediately
    /// after triggering signal delivery; it does not wait for the worker to
    /// exit. Idempotent: cancelling an already-cancelling job is a no-op
    /// that still reports `true`.
    pub async fn cancel(&self) -> bool {
        let mut slot = self.slot.lock().await;
        match slot.as_mut() {
            None => {
                tracing::debug!("Cancel requested with no job running");
                false
            }
            Some(job) => {
                if job.status == JobStatus::Running {
                    job.status = JobStatus::Cancelling;
                    job.cancel.cancel();
                    tracing::info!(job_id = %job.id, "Cancellation requested, signalling worker");
                }
                true
            }
        }
    }

    /// Own the child process until it exits, then publish the terminal
    /// result and free the slot.
    async fn monitor(
        self: Arc<Self>,
        id: JobId,
        mut child: Child,
        stdout: Option<ChildStdout>,
        stderr: Option<ChildStderr>,
        fallback_output: PathBuf,
        cancel: CancellationToken,
    ) {
        let bus = Arc::clone(&self.bus);
        let stdout_task = tokio::spawn(async move { pump_stdout(id, stdout, bus).await });
        let stderr_task = tokio::spawn(async move { read_capped(stderr).await });

        let wait_result = tokio::select! {
            status = child.wait() => status,
            _ = cancel.cancelled() => {
                terminate(&mut child);
                child.wait().await
            }
        };

        // Stream pumps finish at EOF, which the exit above guarantees; join
        // them so the terminal event is published after every stdout event.
        let last_output = stdout_task.await.unwrap_or_default();
        let stderr_text = stderr_task.await.unwrap_or_default();

        let mut slot = self.slot.lock().await;
        let cancelling = matches!(
            slot.as_ref(),
            Some(job) if job.status == JobStatus::Cancelling
        );

        let (final_status, result) = match wait_result {
            Err(e) => {
                tracing::error!(job_id = %id, error = %e, "Failed to await worker process");
                (JobStatus::Failed, JobResult::failed(None, &e.to_string()))
            }
            Ok(_) if cancelling => (JobStatus::Cancelled, JobResult::cancelled()),
            Ok(status) if status.success() => {
                let path = last_output
                    .unwrap_or_else(|| fallback_output.to_string_lossy().into_owned());
                (JobStatus::Completed, JobResult::completed(path))
            }
            Ok(status) => (
                JobStatus::Failed,
                JobResult::failed(status.code(), &stderr_text),
            ),
        };

        tracing::info!(
            job_id = %id,
            status = %final_status,
            exit_code = result.exit_code,
            "Generation job finished",
        );

        // Publish while still holding the slot so a new launch cannot slip
        // in ahead of the terminal event.
        self.bus.publish(JobEvent::JobFinished {
            job_id: id,
            result,
        });
        *slot = None;
    }
}

/// Pump the worker's stdout through the line protocol parser, publishing
/// recognized events on the bus. Returns the last `OUTPUT:` path observed.
async fn pump_stdout(
    id: JobId,
    stdout: Option<ChildStdout>,
    bus: Arc<JobEventBus>,
) -> Option<String> {
    let Some(mut stdout) = stdout else {
        return None;
    };

    let mut parser = LineProtocolParser::new();
    let mut last_output = None;
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                for event in parser.push_chunk(&buf[..n]) {
                    handle_event(id, event, &bus, &mut last_output);
                }
            }
            Err(e) => {
                tracing::warn!(job_id = %id, error = %e, "Error reading worker stdout");
                break;
            }
        }
    }

    // A final line without a trailing newline still counts.
    if let Some(event) = parser.finish() {
        handle_event(id, event, &bus, &mut last_output);
    }
    last_output
}

/// Route one parsed protocol event: progress and status go to the bus,
/// output paths are remembered for the terminal result, anything else is
/// logged and dropped.
fn handle_event(id: JobId, event: ProtocolEvent, bus: &JobEventBus, last_output: &mut Option<String>) {
    match event {
        ProtocolEvent::Progress { percent } => {
            bus.publish(JobEvent::JobProgress {
                job_id: id,
                percent,
            });
        }
        ProtocolEvent::Status { message } => {
            bus.publish(JobEvent::JobStatus {
                job_id: id,
                message,
            });
        }
        ProtocolEvent::Output { path } => {
            // A bare `OUTPUT:` line carries no usable path; keep the
            // fallback so a successful result always names a real file.
            if path.is_empty() {
                tracing::debug!(job_id = %id, "Ignoring empty worker output path");
            } else {
                *last_output = Some(path);
            }
        }
        ProtocolEvent::Unrecognized { line } => {
            tracing::debug!(job_id = %id, line, "Ignoring unrecognized worker output");
        }
    }
}

/// Read an entire stream into a string, capped at [`MAX_STDERR_BYTES`].
async fn read_capped<R: AsyncRead + Unpin>(handle: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h)
            .take(MAX_STDERR_BYTES as u64)
            .read_to_end(&mut buf)
            .await;
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Deliver a termination signal to the worker.
///
/// Best-effort: SIGTERM on Unix with no forced-kill escalation if the
/// worker ignores it. Non-Unix platforms fall back to a hard kill.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = child.id() {
            let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }
    }
    #[cfg(not(unix))]
    {
        let _ = child.start_kill();
    }
}
