//! FFprobe integration for duration probing.
//!
//! This module provides the `DurationProbe` seam and its default
//! implementation backed by the `ffprobe` crate. A probe either yields a
//! usable (strictly positive) duration or a `CoreError::Probe`.

use crate::error::{CoreResult, probe_error};
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Something that can report the total duration of a media file.
pub trait DurationProbe {
    /// Returns the duration of `path` in seconds.
    ///
    /// Implementations must fail with `CoreError::Probe` when the file is
    /// unreadable, not a media container, or has no duration. A returned
    /// value of zero is treated by callers the same as a failure.
    fn probe(&self, path: &Path) -> CoreResult<f64>;
}

/// `DurationProbe` implementation that shells out to `ffprobe` via the
/// `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl DurationProbe for CrateFfprobeExecutor {
    fn probe(&self, path: &Path) -> CoreResult<f64> {
        log::debug!("Running ffprobe (via crate) for duration on: {}", path.display());
        match ffprobe(path) {
            Ok(metadata) => {
                let raw = metadata.format.duration.as_deref().ok_or_else(|| {
                    probe_error(path.display(), "container reports no duration")
                })?;
                parse_duration_field(raw).ok_or_else(|| {
                    probe_error(path.display(), format!("unusable duration '{raw}'"))
                })
            }
            Err(err) => {
                log::warn!("ffprobe failed for {}: {err:?}", path.display());
                Err(map_ffprobe_error(err, path))
            }
        }
    }
}

/// Parses ffprobe's decimal duration string, rejecting non-positive values.
pub(crate) fn parse_duration_field(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
}

fn map_ffprobe_error(err: FfProbeError, path: &Path) -> crate::error::CoreError {
    let reason = match err {
        FfProbeError::Io(io_err) => format!("could not run ffprobe: {io_err}"),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            format!("ffprobe exited with {}: {}", output.status, stderr.trim())
        }
        FfProbeError::Deserialize(err) => format!("unreadable ffprobe output: {err}"),
        other => format!("unknown ffprobe error: {other:?}"),
    };
    probe_error(path.display(), reason)
}
