// ============================================================================
// squeeze-core/src/processing/mod.rs
// ============================================================================
//
// PROCESSING: Job state, batch state, and the sequential orchestrator
//
// KEY COMPONENTS:
// - job: EncodingJob state machine and MediaFile
// - batch: BatchRun, BatchSummary, CancellationToken
// - orchestrator: BatchOrchestrator, the sequential encode loop
// - worker: spawn_batch and BatchHandle for background execution

pub mod batch;
pub mod job;
pub mod orchestrator;
pub mod worker;

pub use batch::{BatchRun, BatchSummary, CancellationToken, JobOutcome};
pub use job::{EncodingJob, JobId, JobStatus, MediaFile};
pub use orchestrator::BatchOrchestrator;
pub use worker::{BatchHandle, spawn_batch};
