//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`JobEventBus`] fans out [`JobEvent`]s from the supervisor to any number
//! of subscribers (the WebSocket forwarder, tests). Publishing never blocks:
//! when the buffer fills, the oldest unconsumed events are dropped and slow
//! receivers observe `RecvError::Lagged`. Shared via `Arc<JobEventBus>`.

use boardreel_core::types::{JobId, JobResult};
use serde::Serialize;
use tokio::sync::broadcast;

/// An observable state change of the active generation job.
///
/// Serialized for WebSocket clients with a `type` tag
/// (`job_progress` / `job_status` / `job_finished`).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// The worker reported a completion percentage.
    JobProgress { job_id: JobId, percent: u8 },

    /// The worker reported a human-readable status message.
    JobStatus { job_id: JobId, message: String },

    /// The job reached a terminal state. This is always the last event
    /// published for a job; `result` distinguishes completed, failed, and
    /// cancelled outcomes.
    JobFinished { job_id: JobId, result: JobResult },
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out hub for [`JobEvent`]s.
pub struct JobEventBus {
    sender: broadcast::Sender<JobEvent>,
}

impl JobEventBus {
    /// Create a bus with a specific channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With zero subscribers the event is silently dropped; a job's progress
    /// is not required to be observed.
    pub fn publish(&self, event: JobEvent) {
        // SendError only means there are no receivers right now.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.sender.subscribe()
    }
}

impl Default for JobEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
