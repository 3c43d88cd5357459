use super::state::BatchState;
use crate::{AttemptOutcome, EngineConfig, Error, Progress, RandSource, Registrar};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything a worker needs to process slots of one batch.
pub(crate) struct WorkerContext<R, S>
where
    S: RandSource<u64>,
{
    pub(crate) batch: Arc<BatchState<S>>,
    pub(crate) registrar: Arc<R>,
    pub(crate) config: Arc<EngineConfig>,
    pub(crate) progress: Arc<dyn Progress>,
    pub(crate) stop: CancellationToken,
}

/// How a slot was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotOutcome {
    Registered,
    /// A transient error ended the slot.
    Failed,
    /// Every attempt conflicted (or failed, with `retry_transient`).
    Exhausted,
    /// The stop signal fired between two attempts.
    Abandoned,
}

/// Worker task: claims slots until none are left or the stop token fires.
///
/// The token is checked before claiming each slot and before each retry. An
/// attempt that is already in flight is always allowed to finish, bounded by
/// the attempt timeout.
pub(crate) async fn worker_loop<R, S>(worker_id: usize, ctx: WorkerContext<R, S>)
where
    R: Registrar,
    S: RandSource<u64>,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} started");

    while !ctx.stop.is_cancelled() {
        let Some(slot) = ctx.batch.claim_slot() else {
            break;
        };

        match register_slot(worker_id, slot, &ctx).await {
            SlotOutcome::Registered => {}
            SlotOutcome::Abandoned => ctx.batch.record_failed(false),
            SlotOutcome::Failed | SlotOutcome::Exhausted => ctx.batch.record_failed(true),
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} stopped");
}

async fn register_slot<R, S>(_worker_id: usize, _slot: usize, ctx: &WorkerContext<R, S>) -> SlotOutcome
where
    R: Registrar,
    S: RandSource<u64>,
{
    let config = &*ctx.config;

    for attempt in 1..=config.max_attempts {
        if attempt > 1 && ctx.stop.is_cancelled() {
            #[cfg(feature = "tracing")]
            tracing::debug!("Slot {_slot} abandoned after {} attempts: batch stopping", attempt - 1);
            return SlotOutcome::Abandoned;
        }

        let deveui = match ctx.batch.allocator.generate_unique_identifier() {
            Ok(deveui) => deveui,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::error!("Slot {_slot} failed: {_e}");
                return SlotOutcome::Failed;
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "    - Registering {deveui} (worker {_worker_id}, slot {_slot}, attempt {attempt}/{}) ...",
            config.max_attempts
        );

        let request = ctx
            .registrar
            .attempt(deveui, &config.endpoint, config.attempt_timeout);
        let outcome = tokio::time::timeout(config.attempt_timeout, request)
            .await
            .unwrap_or_else(|_| {
                AttemptOutcome::TransientError(Error::AttemptTimeout(config.attempt_timeout))
            });

        match outcome {
            AttemptOutcome::Success => {
                ctx.batch.record_registered(deveui);
                ctx.progress.tick(deveui);
                #[cfg(feature = "tracing")]
                tracing::debug!(" OK - Registered {deveui} (slot {_slot})");
                return SlotOutcome::Registered;
            }
            AttemptOutcome::Conflict => {
                #[cfg(feature = "tracing")]
                tracing::debug!("NOK - {deveui} is already registered (slot {_slot})");
            }
            AttemptOutcome::TransientError(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("ERR - Registering {deveui} failed (slot {_slot}): {_e}");
                if !config.retry_transient {
                    return SlotOutcome::Failed;
                }
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::warn!(
        "Slot {_slot} gave up after {} attempts",
        config.max_attempts
    );
    SlotOutcome::Exhausted
}
