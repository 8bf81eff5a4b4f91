//! End-to-end supervisor tests driven by stand-in shell workers.

#![cfg(unix)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use tokio::sync::broadcast;

use boardreel_core::resolver::WorkerCommand;
use boardreel_core::types::{GenerationRequest, JobResult, JobStatus, RemoteParams};
use boardreel_events::{JobEvent, JobEventBus};
use boardreel_supervisor::{JobSupervisor, LaunchError};

const RECV_TIMEOUT: Duration = Duration::from_secs(10);

fn new_supervisor() -> (Arc<JobSupervisor>, broadcast::Receiver<JobEvent>) {
    let bus = Arc::new(JobEventBus::default());
    let supervisor = JobSupervisor::new(std::env::temp_dir(), bus);
    let rx = supervisor.subscribe();
    (supervisor, rx)
}

/// A worker that runs `script` under `/bin/sh -c`.
fn sh_worker(script: &str) -> WorkerCommand {
    WorkerCommand {
        program: PathBuf::from("/bin/sh"),
        args: vec!["-c".to_string(), script.to_string()],
        working_dir: std::env::temp_dir(),
        fallback_output: PathBuf::from("/tmp/fallback.mp4"),
    }
}

async fn recv_event(rx: &mut broadcast::Receiver<JobEvent>) -> JobEvent {
    tokio::time::timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Drain events until the terminal one, returning the result.
async fn wait_for_finished(rx: &mut broadcast::Receiver<JobEvent>) -> JobResult {
    loop {
        if let JobEvent::JobFinished { result, .. } = recv_event(rx).await {
            return result;
        }
    }
}

#[tokio::test]
async fn successful_job_reports_last_output_path() {
    let (supervisor, mut rx) = new_supervisor();
    supervisor
        .spawn_worker(sh_worker(
            "printf 'STATUS:working\\nPROGRESS:10\\nOUTPUT:/tmp/first.mp4\\nOUTPUT:/tmp/x.mp4\\n'",
        ))
        .await
        .expect("spawn");

    assert_matches!(
        recv_event(&mut rx).await,
        JobEvent::JobStatus { message, .. } if message == "working"
    );
    assert_matches!(
        recv_event(&mut rx).await,
        JobEvent::JobProgress { percent: 10, .. }
    );

    let result = wait_for_finished(&mut rx).await;
    assert!(result.success);
    assert_eq!(result.video_path.as_deref(), Some("/tmp/x.mp4"));
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(supervisor.status().await, JobStatus::Idle);
}

#[tokio::test]
async fn successful_job_without_output_uses_fallback() {
    let (supervisor, mut rx) = new_supervisor();
    supervisor
        .spawn_worker(sh_worker("printf 'PROGRESS:100\\n'"))
        .await
        .expect("spawn");

    let result = wait_for_finished(&mut rx).await;
    assert!(result.success);
    assert_eq!(result.video_path.as_deref(), Some("/tmp/fallback.mp4"));
}

#[tokio::test]
async fn empty_output_path_falls_back_to_default() {
    let (supervisor, mut rx) = new_supervisor();
    supervisor
        .spawn_worker(sh_worker("printf 'OUTPUT:\\n'"))
        .await
        .expect("spawn");

    let result = wait_for_finished(&mut rx).await;
    assert!(result.success);
    assert_ne!(result.video_path.as_deref(), Some(""));
    assert_eq!(result.video_path.as_deref(), Some("/tmp/fallback.mp4"));
}

#[tokio::test]
async fn failed_job_captures_stderr_and_exit_code() {
    let (supervisor, mut rx) = new_supervisor();
    supervisor
        .spawn_worker(sh_worker("echo boom >&2; exit 1"))
        .await
        .expect("spawn");

    let result = wait_for_finished(&mut rx).await;
    assert!(!result.success);
    assert!(result.video_path.is_none());
    assert_eq!(result.error.as_deref(), Some("boom"));
    assert_eq!(result.exit_code, Some(1));
    assert_eq!(supervisor.status().await, JobStatus::Idle);
}

#[tokio::test]
async fn failed_job_without_stderr_gets_generic_error() {
    let (supervisor, mut rx) = new_supervisor();
    supervisor
        .spawn_worker(sh_worker("exit 3"))
        .await
        .expect("spawn");

    let result = wait_for_finished(&mut rx).await;
    assert_eq!(result.error.as_deref(), Some("worker process failed"));
    assert_eq!(result.exit_code, Some(3));
}

#[tokio::test]
async fn second_launch_is_rejected_while_running() {
    let (supervisor, mut rx) = new_supervisor();
    supervisor
        .spawn_worker(sh_worker("sleep 5"))
        .await
        .expect("spawn");
    assert_eq!(supervisor.status().await, JobStatus::Running);

    let err = supervisor
        .spawn_worker(sh_worker("printf 'PROGRESS:1\\n'"))
        .await
        .expect_err("slot is occupied");
    assert_matches!(err, LaunchError::Conflict);

    // The first job is unaffected by the rejected launch.
    assert_eq!(supervisor.status().await, JobStatus::Running);

    assert!(supervisor.cancel().await);
    let result = wait_for_finished(&mut rx).await;
    assert_eq!(result.error.as_deref(), Some("cancelled"));
}

#[tokio::test]
async fn cancel_on_idle_supervisor_is_a_noop() {
    let (supervisor, _rx) = new_supervisor();
    assert!(!supervisor.cancel().await);
    assert_eq!(supervisor.status().await, JobStatus::Idle);
}

#[tokio::test]
async fn cancel_transitions_through_cancelling_to_cancelled() {
    let (supervisor, mut rx) = new_supervisor();
    supervisor
        .spawn_worker(sh_worker("sleep 5"))
        .await
        .expect("spawn");

    assert!(supervisor.cancel().await);
    assert_eq!(supervisor.status().await, JobStatus::Cancelling);

    let result = wait_for_finished(&mut rx).await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("cancelled"));
    assert_eq!(supervisor.status().await, JobStatus::Idle);
}

#[tokio::test]
async fn cancel_is_idempotent() {
    let (supervisor, mut rx) = new_supervisor();
    supervisor
        .spawn_worker(sh_worker("sleep 5"))
        .await
        .expect("spawn");

    assert!(supervisor.cancel().await);
    assert!(supervisor.cancel().await);

    let result = wait_for_finished(&mut rx).await;
    assert_eq!(result.error.as_deref(), Some("cancelled"));
}

#[tokio::test]
async fn cancelled_result_wins_over_exit_code() {
    // A worker that exits zero on TERM still reports a cancelled result.
    let (supervisor, mut rx) = new_supervisor();
    supervisor
        .spawn_worker(sh_worker(
            "trap 'exit 0' TERM; sleep 5 >/dev/null 2>&1 & wait $!",
        ))
        .await
        .expect("spawn");

    assert!(supervisor.cancel().await);
    let result = wait_for_finished(&mut rx).await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("cancelled"));
}

#[tokio::test]
async fn slot_frees_after_terminal_state_and_accepts_relaunch() {
    let (supervisor, mut rx) = new_supervisor();

    supervisor
        .spawn_worker(sh_worker("printf 'OUTPUT:/tmp/a.mp4\\n'"))
        .await
        .expect("first spawn");
    assert!(wait_for_finished(&mut rx).await.success);
    assert_eq!(supervisor.status().await, JobStatus::Idle);

    supervisor
        .spawn_worker(sh_worker("printf 'OUTPUT:/tmp/b.mp4\\n'"))
        .await
        .expect("second spawn");
    let result = wait_for_finished(&mut rx).await;
    assert_eq!(result.video_path.as_deref(), Some("/tmp/b.mp4"));
}

#[tokio::test]
async fn progress_line_split_across_writes_yields_one_event() {
    let (supervisor, mut rx) = new_supervisor();
    supervisor
        .spawn_worker(sh_worker("printf 'PROGRESS:'; sleep 0.2; printf '50\\n'"))
        .await
        .expect("spawn");

    let mut progress_events = Vec::new();
    loop {
        match recv_event(&mut rx).await {
            JobEvent::JobProgress { percent, .. } => progress_events.push(percent),
            JobEvent::JobFinished { .. } => break,
            JobEvent::JobStatus { .. } => {}
        }
    }
    assert_eq!(progress_events, vec![50]);
}

#[tokio::test]
async fn trailing_line_without_newline_is_flushed() {
    let (supervisor, mut rx) = new_supervisor();
    supervisor
        .spawn_worker(sh_worker("printf 'OUTPUT:/tmp/tail.mp4'"))
        .await
        .expect("spawn");

    let result = wait_for_finished(&mut rx).await;
    assert_eq!(result.video_path.as_deref(), Some("/tmp/tail.mp4"));
}

#[tokio::test]
async fn spawn_failure_is_synchronous_and_leaves_slot_idle() {
    let (supervisor, _rx) = new_supervisor();
    let err = supervisor
        .spawn_worker(WorkerCommand {
            program: PathBuf::from("/nonexistent/worker-binary"),
            args: vec![],
            working_dir: std::env::temp_dir(),
            fallback_output: PathBuf::from("/tmp/fallback.mp4"),
        })
        .await
        .expect_err("binary does not exist");
    assert_matches!(err, LaunchError::Spawn(_));
    assert_eq!(supervisor.status().await, JobStatus::Idle);
}

#[tokio::test]
async fn invalid_request_is_rejected_before_any_spawn() {
    let (supervisor, _rx) = new_supervisor();
    let request = GenerationRequest::Remote(RemoteParams {
        board_url: String::new(),
        duration_secs: 60,
        recency_weight: 0.7,
        num_images: None,
    });

    let err = supervisor.launch(request).await.expect_err("empty board URL");
    assert_matches!(err, LaunchError::Validation(_));
    assert_eq!(supervisor.status().await, JobStatus::Idle);
}
