use crate::{Endpoint, Error, Result};
use core::time::Duration;

/// Identifiers registered when the caller does not say otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// Deadline of a single registration attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);
/// Registration attempts in flight at once.
pub const DEFAULT_NUM_WORKERS: usize = 10;
/// Upper bound on `num_workers`.
pub const MAX_NUM_WORKERS: usize = 10;
/// Attempts per slot before the slot is abandoned.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Parameters of a [`RegistrationEngine`].
///
/// Built once from the command line (or by tests) and handed to the engine;
/// nothing here is read from process-wide state.
///
/// [`RegistrationEngine`]: crate::RegistrationEngine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Where registration requests are sent.
    pub endpoint: Endpoint,
    /// Deadline of each registration attempt.
    pub attempt_timeout: Duration,
    /// Number of concurrent workers, `1..=MAX_NUM_WORKERS`.
    pub num_workers: usize,
    /// Attempts per slot, counting the first one.
    pub max_attempts: usize,
    /// Retry transient errors like conflicts instead of failing the slot.
    pub retry_transient: bool,
}

impl EngineConfig {
    /// Creates a configuration with default limits for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the address cannot be used.
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: Endpoint::parse(endpoint)?,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            num_workers: DEFAULT_NUM_WORKERS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_transient: false,
        })
    }

    #[must_use]
    pub const fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    #[must_use]
    pub const fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub const fn with_retry_transient(mut self, retry_transient: bool) -> Self {
        self.retry_transient = retry_transient;
        self
    }

    /// Checks every limit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_NUM_WORKERS).contains(&self.num_workers) {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "num_workers must be between 1 and {MAX_NUM_WORKERS}, got {}",
                    self.num_workers
                ),
            });
        }
        if self.max_attempts == 0 {
            return Err(Error::InvalidConfig {
                reason: "max_attempts must be greater than 0".to_string(),
            });
        }
        if self.attempt_timeout.is_zero() {
            return Err(Error::InvalidConfig {
                reason: "attempt_timeout must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Deadline of a whole batch: `attempt_timeout * batch_size / num_workers`.
    ///
    /// This is the time a worker needs if every identifier it handles costs one
    /// full attempt timeout.
    pub fn total_timeout(&self, batch_size: usize) -> Duration {
        let batch_size = u32::try_from(batch_size).unwrap_or(u32::MAX);
        let num_workers = u32::try_from(self.num_workers.max(1)).unwrap_or(u32::MAX);
        self.attempt_timeout.saturating_mul(batch_size) / num_workers
    }
}
