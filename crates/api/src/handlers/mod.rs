//! HTTP request handlers.

pub mod generation;
pub mod readiness;
