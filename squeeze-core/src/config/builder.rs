// ============================================================================
// squeeze-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig starting from the observed defaults.

use std::path::PathBuf;

use super::CoreConfig;

/// Builder for creating CoreConfig instances.
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = output_dir.into();
        self
    }

    pub fn output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.output_suffix = suffix.into();
        self
    }

    pub fn output_extension(mut self, extension: impl Into<String>) -> Self {
        self.config.output_extension = extension.into();
        self
    }

    pub fn remove_partial_output(mut self, remove: bool) -> Self {
        self.config.remove_partial_output = remove;
        self
    }

    pub fn ffmpeg_path(mut self, path: impl Into<String>) -> Self {
        self.config.ffmpeg_path = path.into();
        self
    }

    /// Builds the configuration. Call `CoreConfig::validate` before use.
    pub fn build(self) -> CoreConfig {
        self.config
    }
}
