//! Bounded-concurrency batch registration.
//!
//! This module defines [`RegistrationEngine`], which registers a batch of
//! freshly generated DevEUIs against a [`Registrar`] using a fixed pool of
//! worker tasks.
//!
//! ## Responsibilities
//!
//! - Spawn `num_workers` workers per run; each claims slots from a shared
//!   counter until every slot has been handed out.
//! - Per slot, draw an identifier with a unique short code, attempt the
//!   registration, and retry with a new identifier on conflict, up to
//!   `max_attempts` tries.
//! - Bound the whole run by `attempt_timeout * batch_size / num_workers`.
//! - Stop on the caller's [`CancellationToken`] the same way it stops on the
//!   deadline: no new slot or retry starts, in-flight attempts finish, and the
//!   identifiers confirmed so far are returned. If those in-flight attempts
//!   resolve every slot, the run still reports [`RunOutcome::Completed`].
//!
//! Per-slot failures never fail the run. The only errors surfaced to callers
//! are configuration errors, reported by [`RegistrationEngine::new`] before
//! any attempt is made.

mod config;
mod progress;
mod result;
mod state;
mod worker;

pub use config::*;
pub use progress::*;
pub use result::*;

use crate::{RandSource, Registrar, Result, ShortCodeAllocator, ThreadRandom};
use state::BatchState;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use worker::{WorkerContext, worker_loop};

/// Registers batches of DevEUIs with bounded parallelism.
///
/// The engine itself holds no per-run state: every call to
/// [`run_batch`](Self::run_batch) starts with an empty short-code set and an
/// empty result set, so one engine can serve consecutive or concurrent runs.
pub struct RegistrationEngine<R, S = ThreadRandom>
where
    R: Registrar,
    S: RandSource<u64>,
{
    config: Arc<EngineConfig>,
    registrar: Arc<R>,
    rng: S,
    progress: Arc<dyn Progress>,
}

impl<R> RegistrationEngine<R>
where
    R: Registrar,
{
    /// Creates an engine drawing identifiers from the thread-local RNG.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`](crate::Error::InvalidConfig) if the
    /// configuration is out of range. Nothing is sent in that case.
    pub fn new(config: EngineConfig, registrar: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            registrar: Arc::new(registrar),
            rng: ThreadRandom,
            progress: Arc::new(NoProgress),
        })
    }
}

impl<R, S> RegistrationEngine<R, S>
where
    R: Registrar,
    S: RandSource<u64> + Clone + Send + Sync + 'static,
{
    /// Replaces the random source used to draw identifiers.
    pub fn with_rand_source<S2>(self, rng: S2) -> RegistrationEngine<R, S2>
    where
        S2: RandSource<u64>,
    {
        RegistrationEngine {
            config: self.config,
            registrar: self.registrar,
            rng,
            progress: self.progress,
        }
    }

    /// Installs a sink receiving one tick per registered identifier.
    #[must_use]
    pub fn with_progress(mut self, progress: impl Progress) -> Self {
        self.progress = Arc::new(progress);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registers up to `batch_size` identifiers.
    ///
    /// Always returns a [`BatchResult`]; a result smaller than `batch_size`
    /// means some slots failed or the aggregate deadline fired.
    pub async fn run_batch(&self, batch_size: usize) -> BatchResult {
        self.run_batch_cancellable(batch_size, &CancellationToken::new())
            .await
    }

    /// Registers up to `batch_size` identifiers, stopping early if `cancel`
    /// fires.
    ///
    /// On cancellation or deadline, workers stop claiming slots and retrying,
    /// attempts already in flight finish, and the returned result holds only
    /// identifiers whose registration was confirmed.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(batch_size = batch_size, workers = self.config.num_workers)))]
    pub async fn run_batch_cancellable(
        &self,
        batch_size: usize,
        cancel: &CancellationToken,
    ) -> BatchResult {
        if batch_size == 0 {
            return BatchResult::new(0, Default::default(), RunOutcome::Completed);
        }

        let total_timeout = self.config.total_timeout(batch_size);
        #[cfg(feature = "tracing")]
        tracing::debug!("Starting batch of {batch_size} with total timeout {total_timeout:?}");

        let batch = Arc::new(BatchState::new(
            batch_size,
            ShortCodeAllocator::new(self.rng.clone()),
        ));
        // A child token lets the deadline stop this run's workers without
        // cancelling the caller's token.
        let stop = cancel.child_token();

        let mut workers = JoinSet::new();
        for worker_id in 0..self.config.num_workers.min(batch_size) {
            let ctx = WorkerContext {
                batch: Arc::clone(&batch),
                registrar: Arc::clone(&self.registrar),
                config: Arc::clone(&self.config),
                progress: Arc::clone(&self.progress),
                stop: stop.clone(),
            };
            workers.spawn(worker_loop(worker_id, ctx));
        }

        let mut outcome = tokio::select! {
            biased;
            () = stop.cancelled() => RunOutcome::Cancelled,
            () = join_workers(&mut workers) => RunOutcome::Completed,
            () = tokio::time::sleep(total_timeout) => RunOutcome::TimedOut,
        };

        if outcome.is_aborted() {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                "Batch {outcome} after starting {}/{batch_size} slots, waiting for in-flight requests (attempt timeout {:?})",
                batch.started_slots(),
                self.config.attempt_timeout
            );
            stop.cancel();
            join_workers(&mut workers).await;

            // Attempts in flight at the stop may have resolved the last slots.
            if batch.is_resolved() {
                outcome = RunOutcome::Completed;
            }
        }

        let registered = batch.take_registered();
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Batch {outcome}: {}/{batch_size} registered, {} slots failed",
            registered.len(),
            batch.failed_slots()
        );

        BatchResult::new(batch_size, registered, outcome)
    }
}

async fn join_workers(workers: &mut JoinSet<()>) {
    while let Some(joined) = workers.join_next().await {
        if let Err(_e) = joined {
            #[cfg(feature = "tracing")]
            tracing::error!("Worker task failed: {_e}");
        }
    }
}
