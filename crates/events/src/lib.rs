//! Fan-out of job progress to the rest of the daemon.
//!
//! - [`JobEventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`JobEvent`] — the progress, status, and terminal events of one job.

pub mod bus;

pub use bus::{JobEvent, JobEventBus};
