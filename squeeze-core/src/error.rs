// ============================================================================
// squeeze-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Core error taxonomy for squeeze-core
//
// This module defines the error type shared by every component of the
// compression engine, plus helpers for building process-related errors
// consistently.
//
// KEY COMPONENTS:
// - CoreError: thiserror-based enum covering probe, spawn, and runtime failures
// - CoreResult: Result alias used across the crate
// - FailureKind / JobError: cloneable failure record stored on a job
//
// Parsing irregularities (unmatched progress lines) and ETA guards are not
// errors and have no variant here.

use serde::Serialize;
use std::fmt;
use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by squeeze-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("No processable video files found")]
    NoFilesFound,

    #[error("Required dependency '{0}' not found")]
    DependencyNotFound(String),

    #[error("Probe failed for {path}: {reason}")]
    Probe { path: String, reason: String },

    #[error("Failed to start '{0}': {1}")]
    Spawn(String, #[source] io::Error),

    #[error("'{command}' exited with {status}: {stderr}")]
    EncodeRuntime {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Failed waiting for '{0}': {1}")]
    Wait(String, #[source] io::Error),

    #[error("Invalid job transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for squeeze-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

pub fn probe_error(path: impl fmt::Display, reason: impl Into<String>) -> CoreError {
    CoreError::Probe {
        path: path.to_string(),
        reason: reason.into(),
    }
}

pub fn command_start_error(command: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::Spawn(command.into(), err)
}

pub fn command_wait_error(command: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::Wait(command.into(), err)
}

pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::EncodeRuntime {
        command: command.into(),
        status,
        stderr: stderr.into(),
    }
}

/// Category of a job-level failure, as surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Probe,
    Spawn,
    EncodeRuntime,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Probe => write!(f, "probe"),
            FailureKind::Spawn => write!(f, "spawn"),
            FailureKind::EncodeRuntime => write!(f, "encode"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Human-readable failure recorded on a job.
///
/// `CoreError` is not `Clone` (it wraps `io::Error`), so job state keeps this
/// flattened form instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobError {
    pub kind: FailureKind,
    pub message: String,
}

impl JobError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl From<&CoreError> for JobError {
    fn from(err: &CoreError) -> Self {
        let kind = match err {
            CoreError::Probe { .. } => FailureKind::Probe,
            CoreError::Spawn(..) | CoreError::DependencyNotFound(_) => FailureKind::Spawn,
            CoreError::Cancelled => FailureKind::Cancelled,
            _ => FailureKind::EncodeRuntime,
        };
        JobError::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_error_kind_mapping() {
        let probe = probe_error("a.mp4", "no duration");
        assert_eq!(JobError::from(&probe).kind, FailureKind::Probe);

        let spawn = command_start_error("ffmpeg", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(JobError::from(&spawn).kind, FailureKind::Spawn);

        let wait = command_wait_error("ffmpeg", io::Error::other("broken pipe"));
        assert_eq!(JobError::from(&wait).kind, FailureKind::EncodeRuntime);

        assert_eq!(JobError::from(&CoreError::Cancelled).kind, FailureKind::Cancelled);
    }

    #[test]
    fn test_probe_error_message() {
        let err = probe_error("/videos/a.mp4", "missing duration");
        assert_eq!(err.to_string(), "Probe failed for /videos/a.mp4: missing duration");
        assert_eq!(
            JobError::from(&err).to_string(),
            "probe error: Probe failed for /videos/a.mp4: missing duration"
        );
    }
}
