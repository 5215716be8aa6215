// ============================================================================
// squeeze-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with the ffmpeg and ffprobe executables
//
// This module encapsulates every interaction with the external encoder and
// prober behind traits, so the orchestrator can be driven by mocks in tests.
//
// KEY COMPONENTS:
// - Traits for external tool interactions (FfmpegSpawner, DurationProbe)
// - Concrete implementations using ffmpeg-sidecar and ffprobe crates
// - Dependency checking

use crate::error::{CoreError, CoreResult};

use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Contains traits and implementations for probing media duration
pub mod ffprobe_executor;

/// Scripted implementations of the external tool traits
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::{
    FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, build_encode_command,
    command_line,
};
pub use ffprobe_executor::{CrateFfprobeExecutor, DurationProbe};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd_name> -version` and only inspects whether it could be started.
///
/// # Returns
///
/// * `Ok(())` - If the command was found
/// * `Err(CoreError::DependencyNotFound)` - If the command is not found
/// * `Err(CoreError::Spawn)` - If the command exists but fails to start
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(CoreError::Spawn(cmd_name.to_string(), e))
        }
    }
}
