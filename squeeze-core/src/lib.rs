//! Core library for batch video compression driven by ffmpeg and ffprobe.
//!
//! This crate probes source durations, runs the encoder with a fixed profile,
//! turns its diagnostic stream into percent-complete and ETA updates, and
//! sequences any number of files as one batch. Presentation layers observe a
//! batch through `events` and snapshots; they never own job state.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use squeeze_core::{
//!     BatchOrchestrator, CoreConfig, CrateFfprobeExecutor, SidecarSpawner, find_processable_files,
//! };
//! use std::path::{Path, PathBuf};
//!
//! let config = CoreConfig::new(PathBuf::from("/path/to/output"));
//! let orchestrator = BatchOrchestrator::new(CrateFfprobeExecutor::new(), SidecarSpawner, config);
//!
//! let sources = find_processable_files(Path::new("/path/to/videos")).unwrap();
//! let files = orchestrator.plan_jobs(&sources).unwrap();
//! let summary = orchestrator.run(&files);
//! println!("{} succeeded, {} failed", summary.succeeded, summary.failed);
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod external;
pub mod processing;
pub mod progress;
pub mod selection;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder, EncodeProfile};
pub use discovery::{find_processable_files, is_supported_video};
pub use error::{CoreError, CoreResult, FailureKind, JobError};
pub use events::{ChannelEventHandler, Event, EventDispatcher, EventHandler};
pub use external::{
    CrateFfprobeExecutor, DurationProbe, FfmpegProcess, FfmpegSpawner, SidecarSpawner,
    check_dependency,
};
pub use processing::{
    BatchHandle, BatchOrchestrator, BatchRun, BatchSummary, CancellationToken, EncodingJob, JobId,
    JobOutcome, JobStatus, MediaFile, spawn_batch,
};
pub use progress::{ProgressSample, estimate_remaining, parse_progress_line};
pub use selection::{InputMode, InputSelection};
pub use utils::{destination_for, format_duration};
