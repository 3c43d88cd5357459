use super::{BatchJob, BatchJobStore};
use crate::server::api::ApiError;
use core::time::Duration;
use deveui::{RandSource, Registrar, RegistrationEngine};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
    time::timeout,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Slack on top of the attempt timeout granted to the running batch on
/// shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct QueuedBatch {
    id: Uuid,
    batch_size: usize,
}

/// Bounded queue of batch jobs drained by one background worker.
///
/// Submissions never wait: a full queue is reported as overload so the API
/// can answer `503` right away.
pub struct JobQueue {
    tx: mpsc::Sender<QueuedBatch>,
    store: Arc<BatchJobStore>,
    shutdown_token: CancellationToken,
    shutdown_timeout: Duration,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl JobQueue {
    /// Starts the worker task. At most `capacity` jobs wait behind the one
    /// being run.
    pub fn spawn<R, S>(
        engine: RegistrationEngine<R, S>,
        store: Arc<BatchJobStore>,
        capacity: usize,
    ) -> Self
    where
        R: Registrar,
        S: RandSource<u64> + Clone + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let shutdown_token = CancellationToken::new();
        let shutdown_timeout = engine.config().attempt_timeout + SHUTDOWN_GRACE;

        let worker = tokio::spawn(queue_worker(
            rx,
            engine,
            Arc::clone(&store),
            shutdown_token.clone(),
        ));

        Self {
            tx,
            store,
            shutdown_token,
            shutdown_timeout,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Creates a `Processing` job and queues it.
    ///
    /// # Errors
    ///
    /// - [`ApiError::ServiceShutdown`] once [`shutdown`](Self::shutdown) has
    ///   started.
    /// - [`ApiError::ServiceOverloaded`] if the queue is full.
    pub fn submit(&self, batch_size: usize) -> Result<BatchJob, ApiError> {
        if self.shutdown_token.is_cancelled() {
            return Err(ApiError::ServiceShutdown);
        }

        // Reserve first so a rejected request leaves no job behind.
        let permit = self.tx.try_reserve().map_err(|e| match e {
            TrySendError::Full(()) => ApiError::ServiceOverloaded {
                details: format!(
                    "{} batches already queued",
                    self.tx.max_capacity()
                ),
            },
            TrySendError::Closed(()) => ApiError::ServiceShutdown,
        })?;

        let job = self.store.create(batch_size);
        permit.send(QueuedBatch {
            id: job.id,
            batch_size,
        });

        #[cfg(feature = "tracing")]
        tracing::info!("Queued batch {} of {batch_size} DevEUIs", job.id);
        Ok(job)
    }

    /// Stops accepting jobs, cancels the running batch and waits for it to
    /// store its partial result.
    ///
    /// Jobs still waiting in the queue are left `Processing`.
    pub async fn shutdown(&self) {
        #[cfg(feature = "tracing")]
        tracing::info!("Shutting down job queue");
        self.shutdown_token.cancel();

        let Some(worker) = self.worker.lock().take() else {
            return;
        };

        match timeout(self.shutdown_timeout, worker).await {
            Ok(Ok(())) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Job queue worker stopped");
            }
            Ok(Err(_e)) => {
                #[cfg(feature = "tracing")]
                tracing::error!("Job queue worker failed: {_e}");
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "Job queue worker did not stop within {:?}",
                    self.shutdown_timeout
                );
            }
        }

        #[cfg(feature = "tracing")]
        {
            let pending = self.store.pending();
            if pending > 0 {
                tracing::warn!(
                    "{pending} of {} batches were still processing at shutdown",
                    self.store.len()
                );
            }
        }
    }
}

async fn queue_worker<R, S>(
    mut rx: mpsc::Receiver<QueuedBatch>,
    engine: RegistrationEngine<R, S>,
    store: Arc<BatchJobStore>,
    shutdown_token: CancellationToken,
) where
    R: Registrar,
    S: RandSource<u64> + Clone + Send + Sync + 'static,
{
    loop {
        tokio::select! {
            biased;
            () = shutdown_token.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Job queue worker received shutdown signal");
                break;
            }
            next = rx.recv() => {
                let Some(queued) = next else {
                    break;
                };
                run_job(&engine, &store, queued, &shutdown_token).await;
            }
        }
    }
    rx.close();
}

#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(id = %queued.id, batch_size = queued.batch_size)))]
async fn run_job<R, S>(
    engine: &RegistrationEngine<R, S>,
    store: &BatchJobStore,
    queued: QueuedBatch,
    shutdown_token: &CancellationToken,
) where
    R: Registrar,
    S: RandSource<u64> + Clone + Send + Sync + 'static,
{
    #[cfg(feature = "tracing")]
    tracing::info!("Processing batch");
    let result = engine
        .run_batch_cancellable(queued.batch_size, shutdown_token)
        .await;
    store.complete(queued.id, result);
}
