//! Batch jobs of the daemon.
//!
//! A request creates a [`BatchJob`] in `Processing` state and queues it. A
//! single background task runs queued jobs one after another and marks each
//! `Completed` with the identifiers it registered. Jobs are never removed.

mod queue;
mod store;

pub use queue::*;
pub use store::*;
