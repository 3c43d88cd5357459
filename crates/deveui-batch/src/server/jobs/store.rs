use deveui::{BatchResult, DevEui, RunOutcome};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Processing,
    Completed,
}

/// A batch request and, once it has run, its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchJob {
    pub id: Uuid,
    pub status: JobStatus,
    pub batch_size: usize,
    /// How the run ended; absent while processing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RunOutcome>,
    /// Registered identifiers, ordered by value. Empty while processing.
    pub deveuis: Vec<DevEui>,
}

#[derive(Default)]
struct Jobs {
    order: Vec<Uuid>,
    by_id: HashMap<Uuid, BatchJob>,
}

/// In-memory job table shared by the routes and the queue worker.
#[derive(Default)]
pub struct BatchJobStore {
    jobs: RwLock<Jobs>,
}

impl BatchJobStore {
    /// Records a new `Processing` job with a fresh id.
    pub fn create(&self, batch_size: usize) -> BatchJob {
        let job = BatchJob {
            id: Uuid::new_v4(),
            status: JobStatus::Processing,
            batch_size,
            outcome: None,
            deveuis: Vec::new(),
        };

        let mut jobs = self.jobs.write();
        jobs.order.push(job.id);
        jobs.by_id.insert(job.id, job.clone());
        job
    }

    /// Marks a job `Completed` with its result. Returns `false` for an
    /// unknown id.
    pub fn complete(&self, id: Uuid, result: BatchResult) -> bool {
        let outcome = result.outcome();
        let deveuis = result.into_sorted_vec();

        let mut jobs = self.jobs.write();
        let Some(job) = jobs.by_id.get_mut(&id) else {
            #[cfg(feature = "tracing")]
            tracing::warn!("Completed batch {id} is not in the job store");
            return false;
        };
        job.status = JobStatus::Completed;
        job.outcome = Some(outcome);
        job.deveuis = deveuis;
        true
    }

    pub fn get(&self, id: Uuid) -> Option<BatchJob> {
        self.jobs.read().by_id.get(&id).cloned()
    }

    /// Every job in creation order.
    pub fn list(&self) -> Vec<BatchJob> {
        let jobs = self.jobs.read();
        jobs.order
            .iter()
            .filter_map(|id| jobs.by_id.get(id).cloned())
            .collect()
    }

    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub fn len(&self) -> usize {
        self.jobs.read().order.len()
    }

    /// Number of jobs not yet completed.
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub fn pending(&self) -> usize {
        self.jobs
            .read()
            .by_id
            .values()
            .filter(|job| job.status == JobStatus::Processing)
            .count()
    }
}
