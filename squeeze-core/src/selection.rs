//! Input and output selection ahead of a run.
//!
//! `InputSelection` holds what a presentation layer has picked so far and
//! decides when a run may start. A single file runs as a one-job batch; a
//! folder runs every eligible file at its top level.

use crate::config::CoreConfig;
use crate::discovery::{find_processable_files, is_supported_video};
use crate::error::{CoreError, CoreResult};
use crate::processing::MediaFile;
use crate::utils::destination_for;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Single(PathBuf),
    Batch { folder: PathBuf, files: Vec<PathBuf> },
}

#[derive(Debug, Clone, Default)]
pub struct InputSelection {
    input: Option<InputMode>,
    output_dir: Option<PathBuf>,
}

impl InputSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a file or folder as input and returns the number of eligible files.
    ///
    /// On error the previous input is cleared.
    pub fn on_input_selected(&mut self, path: &Path) -> CoreResult<usize> {
        self.input = None;

        let mode = if path.is_dir() {
            let files = find_processable_files(path)?;
            InputMode::Batch {
                folder: path.to_path_buf(),
                files,
            }
        } else if path.is_file() {
            if !is_supported_video(path) {
                return Err(CoreError::PathError(format!(
                    "{} is not a supported video file",
                    path.display()
                )));
            }
            InputMode::Single(path.to_path_buf())
        } else {
            return Err(CoreError::PathError(format!(
                "Input path does not exist: {}",
                path.display()
            )));
        };

        self.input = Some(mode);
        Ok(self.eligible_files().len())
    }

    pub fn on_output_folder_selected(&mut self, path: &Path) -> CoreResult<()> {
        if !path.is_dir() {
            return Err(CoreError::PathError(format!(
                "Output folder is not a directory: {}",
                path.display()
            )));
        }
        self.output_dir = Some(path.to_path_buf());
        Ok(())
    }

    pub fn input(&self) -> Option<&InputMode> {
        self.input.as_ref()
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn is_batch(&self) -> bool {
        matches!(self.input, Some(InputMode::Batch { .. }))
    }

    pub fn eligible_files(&self) -> &[PathBuf] {
        match &self.input {
            Some(InputMode::Single(file)) => std::slice::from_ref(file),
            Some(InputMode::Batch { files, .. }) => files,
            None => &[],
        }
    }

    /// True once input and output are set and at least one file is eligible.
    pub fn can_start(&self) -> bool {
        self.output_dir.is_some() && !self.eligible_files().is_empty()
    }

    /// Builds the ordered job list for a run.
    pub fn on_start_requested(&self, config: &CoreConfig) -> CoreResult<Vec<MediaFile>> {
        let output_dir = match (&self.output_dir, self.can_start()) {
            (Some(dir), true) => dir,
            _ => {
                return Err(CoreError::OperationFailed(
                    "Select an input and an output folder before starting".to_string(),
                ));
            }
        };

        self.eligible_files()
            .iter()
            .map(|source| {
                let dest = destination_for(source, output_dir, config)?;
                Ok(MediaFile::new(source.clone(), dest))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_single_file_selection() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("movie.MOV");
        fs::write(&file, b"").unwrap();

        let mut selection = InputSelection::new();
        assert_eq!(selection.on_input_selected(&file).unwrap(), 1);
        assert!(!selection.is_batch());
        assert!(!selection.can_start());

        selection.on_output_folder_selected(dir.path()).unwrap();
        assert!(selection.can_start());

        let jobs = selection.on_start_requested(&CoreConfig::default()).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].source_path, file);
        assert_eq!(jobs[0].dest_path, dir.path().join("movie_compressed.mp4"));
    }

    #[test]
    fn test_unsupported_file_clears_input() {
        let dir = tempdir().unwrap();
        let video = dir.path().join("a.mp4");
        let text = dir.path().join("notes.txt");
        fs::write(&video, b"").unwrap();
        fs::write(&text, b"").unwrap();

        let mut selection = InputSelection::new();
        selection.on_input_selected(&video).unwrap();
        assert!(selection.on_input_selected(&text).is_err());
        assert!(selection.input().is_none());
    }

    #[test]
    fn test_empty_folder_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), b"").unwrap();

        let mut selection = InputSelection::new();
        let result = selection.on_input_selected(dir.path());
        assert!(matches!(result, Err(CoreError::NoFilesFound)));
        assert!(selection.input().is_none());
        assert!(selection.on_start_requested(&CoreConfig::default()).is_err());
    }

    #[test]
    fn test_missing_output_folder_is_rejected() {
        let dir = tempdir().unwrap();
        let mut selection = InputSelection::new();
        assert!(selection.on_output_folder_selected(&dir.path().join("nope")).is_err());
        assert!(selection.output_dir().is_none());
    }
}
