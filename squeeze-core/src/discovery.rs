//! File discovery module for finding video files to compress.
//!
//! This module handles the discovery of video files eligible for processing.
//! Only the top level of the provided directory is searched, and a file is
//! eligible when its extension is on the video allow-list (case-insensitive).

use crate::config::VIDEO_EXTENSIONS;
use crate::error::{CoreError, CoreResult};

use std::path::{Path, PathBuf};

/// Returns true when the path's extension is on the video allow-list.
///
/// Only the name is inspected; the file does not need to exist.
#[must_use]
pub fn is_supported_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| VIDEO_EXTENSIONS.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed)))
}

/// Finds video files eligible for processing in the specified directory.
///
/// Subdirectories are not searched. Results are sorted by file name so batch
/// order is stable across platforms.
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Paths to the discovered video files
/// * `Err(CoreError::Io)` - If the directory cannot be read
/// * `Err(CoreError::NoFilesFound)` - If no eligible files are found
///
/// # Examples
///
/// ```rust,no_run
/// use squeeze_core::find_processable_files;
/// use std::path::Path;
///
/// match find_processable_files(Path::new("/path/to/videos")) {
///     Ok(files) => println!("Found {} video files", files.len()),
///     Err(e) => println!("Error finding video files: {}", e),
/// }
/// ```
pub fn find_processable_files(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(input_dir)?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();

            if !path.is_file() {
                return None;
            }

            is_supported_video(&path).then_some(path)
        })
        .collect();

    if files.is_empty() {
        return Err(CoreError::NoFilesFound);
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    log::debug!("Found {} video file(s) in {}", files.len(), input_dir.display());
    Ok(files)
}
