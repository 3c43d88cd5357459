//! Error types for DevEUI batch registration.
//!
//! Only [`Error::InvalidConfig`] and [`Error::InvalidEndpoint`] are fatal: they
//! are returned before a batch starts. Every other variant describes why a
//! single attempt or slot failed and is absorbed by the engine, which logs it
//! and moves on.
//!
//! ## Error Cases
//! - `InvalidConfig`: engine parameters are out of range.
//! - `InvalidEndpoint`: the registration API address is missing or malformed.
//! - `InvalidDevEui`: a string could not be parsed as a 16-hex-digit DevEUI.
//! - `ShortCodesExhausted`: the allocator could not find an unused short code.
//! - `Transport`: the HTTP request itself failed (connect, timeout, body).
//! - `UnexpectedStatus`: the registration API answered with a status that is
//!   neither success nor conflict.
//! - `AttemptTimeout`: the attempt exceeded its own deadline.

use core::time::Duration;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the registration engine and its collaborators.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Engine configuration is invalid (worker count, attempt budget, ...).
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The registration endpoint is missing or cannot be used.
    #[error("Invalid registration endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Input was not a 16-hex-digit DevEUI.
    #[error("Invalid DevEUI `{input}`: {reason}")]
    InvalidDevEui { input: String, reason: String },

    /// No unused short code was found within the draw budget.
    #[error("No unused short code found after {draws} draws ({used} codes in use)")]
    ShortCodesExhausted { draws: usize, used: usize },

    /// The HTTP request failed before a response was received.
    #[error("Registration request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The registration API answered with an unexpected status.
    #[error("Registration API returned unexpected status {status}")]
    UnexpectedStatus { status: u16 },

    /// The attempt did not complete within its deadline.
    #[error("Registration attempt timed out after {0:?}")]
    AttemptTimeout(Duration),
}
