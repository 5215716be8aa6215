//! Utility functions for formatting and path handling.
//!
//! General-purpose helpers used throughout squeeze-core: duration
//! formatting, safe filename extraction, and destination naming.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Safely extracts filename from a path.
/// Returns the filename as a String, or an error if the path has no filename component.
pub fn get_filename_safe(path: &Path) -> CoreResult<String> {
    Ok(path
        .file_name()
        .ok_or_else(|| {
            CoreError::PathError(format!("Failed to get filename for {}", path.display()))
        })?
        .to_string_lossy()
        .to_string())
}

/// Derives the destination path for `source` inside `output_dir`.
///
/// The destination keeps the source stem, appends the configured suffix, and
/// forces the configured container extension:
/// `clip.MKV` -> `<output_dir>/clip_compressed.mp4`.
pub fn destination_for(
    source: &Path,
    output_dir: &Path,
    config: &CoreConfig,
) -> CoreResult<PathBuf> {
    let stem = source
        .file_stem()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            CoreError::PathError(format!("Failed to get file stem for {}", source.display()))
        })?
        .to_string_lossy();

    let filename = format!("{stem}{}.{}", config.output_suffix, config.output_extension);
    Ok(output_dir.join(filename))
}
