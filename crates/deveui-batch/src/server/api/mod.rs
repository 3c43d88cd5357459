//! HTTP surface of the daemon.
//!
//! ## Structure
//!
//! - [`handler`] - routes and shared state.
//! - [`error`] - `ApiError` and its mapping to HTTP statuses.

pub mod error;
pub mod handler;

pub use error::ApiError;
pub use handler::{AppState, router};
