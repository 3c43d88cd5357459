use crate::{DevEui, Endpoint, Error};
use core::{future::Future, time::Duration};

/// Result of a single registration attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The registration API accepted the identifier.
    Success,
    /// The identifier is already registered. Expected; the slot retries with a
    /// fresh identifier.
    Conflict,
    /// The attempt failed for any other reason. The cause is kept for logging.
    TransientError(Error),
}

impl AttemptOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Performs one remote registration attempt.
///
/// The engine calls this once per attempt and never retries inside it.
/// Implementations should honour `timeout`; the engine also bounds each call
/// with the same deadline.
///
/// Test doubles implement this trait to script outcomes without a network.
pub trait Registrar: Send + Sync + 'static {
    /// Registers `deveui` at `endpoint`, waiting at most `timeout`.
    fn attempt(
        &self,
        deveui: DevEui,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> impl Future<Output = AttemptOutcome> + Send;
}
