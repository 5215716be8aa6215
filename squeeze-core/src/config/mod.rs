//! Configuration structures and constants for the squeeze-core library.
//!
//! This module provides the fixed encode profile and the batch-level settings
//! that control destination naming and failure cleanup.

mod builder;

use crate::error::{CoreError, CoreResult};
use std::path::PathBuf;

pub use builder::CoreConfigBuilder;

// Default constants

/// Video codec used for every encode.
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";

/// Constant rate factor for the fixed profile.
/// Lower values produce higher quality but larger files. Range: 0-51.
pub const DEFAULT_CRF: u8 = 28;

/// Encoder speed preset for the fixed profile.
pub const DEFAULT_PRESET: &str = "medium";

/// Marker appended to the source file stem to name the destination.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_compressed";

/// Container extension forced on every destination, regardless of source.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "mp4";

/// Source extensions eligible for compression (compared case-insensitively).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov"];

/// Highest CRF accepted by libx264.
const MAX_CRF: u8 = 51;

/// The fixed encoder invocation profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeProfile {
    pub video_codec: String,
    pub crf: u8,
    pub preset: String,
}

impl Default for EncodeProfile {
    fn default() -> Self {
        Self {
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            crf: DEFAULT_CRF,
            preset: DEFAULT_PRESET.to_string(),
        }
    }
}

/// Main configuration structure for the squeeze-core library.
///
/// Created by the consumer (e.g. squeeze-cli) and handed to the
/// `BatchOrchestrator`. `Default` reproduces the observed behavior: fixed
/// x264 profile, `_compressed.mp4` destinations, partial output left on disk.
///
/// # Examples
///
/// ```rust
/// use squeeze_core::config::CoreConfigBuilder;
///
/// let config = CoreConfigBuilder::new()
///     .output_dir("/path/to/output")
///     .remove_partial_output(true)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Folder where destination files are written
    pub output_dir: PathBuf,

    /// Encoder profile applied to every job
    pub profile: EncodeProfile,

    /// Marker appended to the source stem
    pub output_suffix: String,

    /// Destination container extension (without the dot)
    pub output_extension: String,

    /// Delete a failed job's partially written destination
    pub remove_partial_output: bool,

    /// Path or name of the ffmpeg executable
    pub ffmpeg_path: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            profile: EncodeProfile::default(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
            remove_partial_output: false,
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

impl CoreConfig {
    /// Creates a default configuration targeting `output_dir`.
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            ..Default::default()
        }
    }

    /// Checks that the configuration can drive an encode.
    pub fn validate(&self) -> CoreResult<()> {
        if self.profile.video_codec.trim().is_empty() {
            return Err(CoreError::Config("video codec must not be empty".to_string()));
        }
        if self.profile.crf > MAX_CRF {
            return Err(CoreError::Config(format!(
                "crf {} is outside 0-{MAX_CRF}",
                self.profile.crf
            )));
        }
        if self.profile.preset.trim().is_empty() {
            return Err(CoreError::Config("preset must not be empty".to_string()));
        }
        if self.output_suffix.trim().is_empty() {
            return Err(CoreError::Config("output suffix must not be empty".to_string()));
        }
        let ext = self.output_extension.trim();
        if ext.is_empty() || ext.starts_with('.') {
            return Err(CoreError::Config(format!(
                "output extension '{}' must be non-empty and given without a dot",
                self.output_extension
            )));
        }
        if self.ffmpeg_path.trim().is_empty() {
            return Err(CoreError::Config("ffmpeg path must not be empty".to_string()));
        }
        Ok(())
    }
}
