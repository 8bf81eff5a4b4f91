//! HTTP and WebSocket surface of the boardreel daemon.
//!
//! Handlers carry no orchestration logic: they delegate to the
//! [`JobSupervisor`](boardreel_supervisor::JobSupervisor) and the WebSocket
//! layer forwards events straight off the job event bus.

pub mod config;
pub mod error;
pub mod forwarder;
pub mod handlers;
pub mod response;
pub mod router;
pub mod state;
pub mod ws;
