//! Binary-side plumbing around the `deveui` engine.
//!
//! ## Structure
//!
//! - [`config`] - command line and environment configuration.
//! - [`telemetry`] - `tracing` subscriber setup.
//! - [`oneshot`] - run one batch and print the table.
//! - [`jobs`] - in-memory job store and the background job queue.
//! - [`api`] - axum routes of the daemon.

pub mod api;
pub mod config;
pub mod jobs;
pub mod oneshot;
pub mod telemetry;
#[cfg(test)]
pub mod testing;
