//! Single-slot orchestration of the external generation worker.
//!
//! [`JobSupervisor`] owns at most one worker process at a time: it spawns
//! the worker, streams its stdout through the line protocol parser, fans
//! events out via the job event bus, and turns process exit into a terminal
//! [`JobResult`](boardreel_core::types::JobResult).

pub mod supervisor;

pub use supervisor::{JobSupervisor, LaunchError};
