//! Domain types and pure logic for the boardreel daemon.
//!
//! - [`types`] — job identifiers, generation parameters, statuses, results.
//! - [`protocol`] — the worker stdout line protocol and its chunk parser.
//! - [`resolver`] — worker executable and argument vector resolution.
//! - [`readiness`] — backend environment probes.

pub mod protocol;
pub mod readiness;
pub mod resolver;
pub mod types;
