//! Background execution of a batch.
//!
//! `spawn_batch` moves an orchestrator onto a dedicated worker thread. The
//! caller keeps a `BatchHandle`, which receives events over a channel, reads
//! snapshots, and can request cancellation. The worker is the only writer of
//! batch state.

use super::batch::{BatchRun, BatchSummary, CancellationToken};
use super::job::MediaFile;
use super::orchestrator::{BatchOrchestrator, Snapshot};
use crate::error::{CoreError, CoreResult};
use crate::events::{ChannelEventHandler, Event};
use crate::external::{DurationProbe, FfmpegSpawner};

use crossbeam_channel::Receiver;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Presentation-side view of a batch running on its worker thread.
pub struct BatchHandle {
    events: Receiver<Event>,
    snapshot: Arc<Mutex<BatchRun>>,
    cancel: CancellationToken,
    worker: JoinHandle<BatchSummary>,
}

impl BatchHandle {
    /// Events in emission order. Iteration ends once the worker finishes.
    pub fn events(&self) -> &Receiver<Event> {
        &self.events
    }

    /// Copy of the latest published batch state.
    pub fn snapshot(&self) -> BatchRun {
        match self.snapshot.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the worker and returns the batch summary.
    pub fn join(self) -> CoreResult<BatchSummary> {
        self.worker
            .join()
            .map_err(|_| CoreError::OperationFailed("batch worker panicked".to_string()))
    }
}

/// Starts `files` on a new worker thread.
pub fn spawn_batch<P, S>(
    mut orchestrator: BatchOrchestrator<P, S>,
    files: Vec<MediaFile>,
) -> CoreResult<BatchHandle>
where
    P: DurationProbe + Send + 'static,
    S: FfmpegSpawner + Send + 'static,
{
    let (sender, events) = crossbeam_channel::unbounded();
    orchestrator.add_handler(Arc::new(ChannelEventHandler::new(sender)));

    let snapshot = Arc::new(Mutex::new(BatchRun::default()));
    let cancel = orchestrator.cancellation_token();
    let slot = Arc::clone(&snapshot);

    let worker = thread::Builder::new()
        .name("squeeze-batch".to_string())
        .spawn(move || orchestrator.run_with_snapshot(&files, Snapshot::from(&*slot)))
        .map_err(|e| CoreError::OperationFailed(format!("Failed to start batch worker: {e}")))?;

    Ok(BatchHandle {
        events,
        snapshot,
        cancel,
        worker,
    })
}
