// ============================================================================
// squeeze-core/src/processing/batch.rs
// ============================================================================
//
// BATCH STATE: The observable record of one batch run
//
// KEY COMPONENTS:
// - BatchRun: ordered jobs plus the index of the job being worked on
// - JobOutcome / BatchSummary: the result published when a batch completes
// - CancellationToken: shared flag checked by the worker between lines

use super::job::{EncodingJob, JobId, JobStatus};
use crate::error::JobError;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Jobs of a batch in enqueue order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchRun {
    pub jobs: Vec<EncodingJob>,
    /// Job currently being probed or encoded, `None` before start and after completion
    pub current_index: Option<usize>,
}

impl BatchRun {
    pub fn new(jobs: Vec<EncodingJob>) -> Self {
        Self {
            jobs,
            current_index: None,
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn current(&self) -> Option<&EncodingJob> {
        self.current_index.and_then(|index| self.jobs.get(index))
    }

    /// True once every job has reached `Succeeded` or `Failed`.
    pub fn is_complete(&self) -> bool {
        self.jobs.iter().all(|job| job.status().is_terminal())
    }

    pub fn count(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|job| job.status() == status).count()
    }
}

/// Final state of one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobOutcome {
    pub job_id: JobId,
    pub source: PathBuf,
    pub dest: PathBuf,
    pub status: JobStatus,
    pub error: Option<JobError>,
}

impl From<&EncodingJob> for JobOutcome {
    fn from(job: &EncodingJob) -> Self {
        Self {
            job_id: job.id(),
            source: job.source().to_path_buf(),
            dest: job.dest().to_path_buf(),
            status: job.status(),
            error: job.last_error().cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<JobOutcome>,
    pub wall_time_seconds: f64,
}

impl BatchSummary {
    pub fn from_run(run: &BatchRun, wall_time: Duration) -> Self {
        Self {
            total: run.len(),
            succeeded: run.count(JobStatus::Succeeded),
            failed: run.count(JobStatus::Failed),
            outcomes: run.jobs.iter().map(JobOutcome::from).collect(),
            wall_time_seconds: wall_time.as_secs_f64(),
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.succeeded == self.total
    }
}

/// Cooperative stop request for a running batch.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
