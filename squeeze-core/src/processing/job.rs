//! The per-file encoding job and its state machine.
//!
//! ```text
//! Pending -> Probing -> Running -> Succeeded
//!               |          |
//!               +----------+----> Failed
//! ```
//!
//! `Pending -> Failed` is only taken when a batch is cancelled before the job
//! starts. Terminal states never transition again.

use crate::error::{CoreError, CoreResult, JobError};
use crate::progress::{ProgressSample, estimate_remaining, eta_whole_seconds, percent_complete};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Position of a job within its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JobId(pub usize);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0 + 1)
    }
}

/// A source file and the destination it will be encoded to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaFile {
    pub source_path: PathBuf,
    pub dest_path: PathBuf,
}

impl MediaFile {
    pub fn new(source_path: impl Into<PathBuf>, dest_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            dest_path: dest_path.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Probing,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }

    #[must_use]
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Pending, Probing)
                | (Pending, Failed)
                | (Probing, Running)
                | (Probing, Failed)
                | (Running, Succeeded)
                | (Running, Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Pending => "Pending",
            JobStatus::Probing => "Probing",
            JobStatus::Running => "Running",
            JobStatus::Succeeded => "Succeeded",
            JobStatus::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// One source-to-destination transcode.
#[derive(Debug, Clone, Serialize)]
pub struct EncodingJob {
    id: JobId,
    media: MediaFile,
    /// 0 until a probe succeeds
    total_duration_seconds: f64,
    status: JobStatus,
    percent: f64,
    eta_seconds: Option<u64>,
    last_error: Option<JobError>,
    reached_running: bool,
}

impl EncodingJob {
    pub fn new(id: JobId, media: MediaFile) -> Self {
        Self {
            id,
            media,
            total_duration_seconds: 0.0,
            status: JobStatus::Pending,
            percent: 0.0,
            eta_seconds: None,
            last_error: None,
            reached_running: false,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn media(&self) -> &MediaFile {
        &self.media
    }

    pub fn source(&self) -> &Path {
        &self.media.source_path
    }

    pub fn dest(&self) -> &Path {
        &self.media.dest_path
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn total_duration_seconds(&self) -> f64 {
        self.total_duration_seconds
    }

    /// Percent complete, or `None` if the job never reached `Running`.
    pub fn percent(&self) -> Option<f64> {
        self.reached_running.then_some(self.percent)
    }

    /// Whole seconds remaining, or `None` when unknown.
    pub fn eta_seconds(&self) -> Option<u64> {
        self.eta_seconds
    }

    pub fn last_error(&self) -> Option<&JobError> {
        self.last_error.as_ref()
    }

    fn transition(&mut self, next: JobStatus) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        log::debug!("Job {} {}: {} -> {}", self.id, self.source().display(), self.status, next);
        self.status = next;
        Ok(())
    }

    /// `Pending -> Probing`.
    pub fn begin_probe(&mut self) -> CoreResult<()> {
        self.transition(JobStatus::Probing)
    }

    /// `Probing -> Running` with the probed duration, which must be positive.
    pub fn start_running(&mut self, total_duration_seconds: f64) -> CoreResult<()> {
        if !(total_duration_seconds.is_finite() && total_duration_seconds > 0.0) {
            return Err(CoreError::InvalidTransition {
                from: self.status.to_string(),
                to: format!("{} (duration {total_duration_seconds})", JobStatus::Running),
            });
        }
        self.transition(JobStatus::Running)?;
        self.total_duration_seconds = total_duration_seconds;
        self.percent = 0.0;
        self.eta_seconds = None;
        self.reached_running = true;
        Ok(())
    }

    /// Folds one progress sample into percent and ETA. Only valid while `Running`.
    pub fn apply_sample(
        &mut self,
        sample: &ProgressSample,
        wall_elapsed_seconds: f64,
    ) -> CoreResult<()> {
        if self.status != JobStatus::Running {
            return Err(CoreError::InvalidTransition {
                from: self.status.to_string(),
                to: "progress update".to_string(),
            });
        }
        self.percent = percent_complete(sample, self.total_duration_seconds);
        let remaining = estimate_remaining(wall_elapsed_seconds, self.percent);
        self.eta_seconds = Some(eta_whole_seconds(remaining));
        Ok(())
    }

    /// `Running -> Succeeded`.
    pub fn succeed(&mut self) -> CoreResult<()> {
        self.transition(JobStatus::Succeeded)?;
        self.percent = 100.0;
        self.eta_seconds = None;
        Ok(())
    }

    /// Moves the job to `Failed`, recording the cause.
    pub fn fail(&mut self, error: JobError) -> CoreResult<()> {
        self.transition(JobStatus::Failed)?;
        self.eta_seconds = None;
        self.last_error = Some(error);
        Ok(())
    }
}
