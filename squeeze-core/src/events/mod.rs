// ============================================================================
// squeeze-core/src/events/mod.rs
// ============================================================================
//
// EVENTS: Push notifications from the batch worker to presentation layers
//
// The orchestrator never renders anything. It emits `Event`s through an
// `EventDispatcher`, and each attached `EventHandler` decides what to do with
// them (draw a progress bar, print JSON, forward across a thread boundary).
//
// KEY COMPONENTS:
// - Event: batch start, job state change, job progress, batch completion
// - EventHandler: observer trait implemented by presentation layers
// - EventDispatcher: fans each event out to every registered handler
// - ChannelEventHandler: non-blocking hand-off over crossbeam-channel

use crate::error::JobError;
use crate::processing::{BatchSummary, JobId, JobStatus};
use crossbeam_channel::Sender;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    BatchStarted {
        total: usize,
    },

    JobStateChanged {
        job_id: JobId,
        /// 1-based position in the batch
        index: usize,
        total: usize,
        source: String,
        state: JobStatus,
        error: Option<JobError>,
    },

    JobProgress {
        job_id: JobId,
        percent: f64,
        eta_seconds: u64,
        elapsed_media_seconds: f64,
        total_duration_seconds: f64,
    },

    BatchComplete {
        summary: BatchSummary,
    },
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event);
}

pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn emit(&self, event: Event) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards events to a receiver on another thread.
///
/// Sends on an unbounded channel never block. Once the receiver is dropped
/// events are discarded.
pub struct ChannelEventHandler {
    sender: Sender<Event>,
}

impl ChannelEventHandler {
    pub fn new(sender: Sender<Event>) -> Self {
        Self { sender }
    }
}

impl EventHandler for ChannelEventHandler {
    fn handle(&self, event: &Event) {
        if self.sender.send(event.clone()).is_err() {
            log::trace!("Event receiver dropped; discarding {event:?}");
        }
    }
}
