// ============================================================================
// squeeze-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning the encoder and reading its
// diagnostic stream line by line.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar
// - build_encode_command: The fixed-profile encode invocation

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, command_start_error, command_wait_error};
use crate::progress::StderrLines;
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::io::BufReader;
use std::path::Path;
use std::process::ExitStatus;

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Feeds every diagnostic line to `handler` until the stream closes.
    ///
    /// Returning an error from the handler stops reading early.
    fn handle_stderr_lines<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(&str) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;

    /// Terminates the process.
    fn kill(&mut self) -> CoreResult<()>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_stderr_lines<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(&str) -> CoreResult<()>,
    {
        let stderr = self.0.take_stderr().ok_or_else(|| {
            CoreError::OperationFailed("ffmpeg stderr was not captured".to_string())
        })?;
        for line in StderrLines::new(BufReader::new(stderr)) {
            log::trace!(target: "squeeze::encoder", "{line}");
            handler(&line)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (sidecar)", e))
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.0
            .kill()
            .map_err(|e| command_wait_error("ffmpeg (sidecar kill)", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg (sidecar)", e))
    }
}

/// Builds the fixed-profile encode command for one job.
///
/// Produces `ffmpeg -hide_banner -nostdin -y -i <src> -c:v <codec> -crf <n>
/// -preset <p> <dest>`.
pub fn build_encode_command(source: &Path, dest: &Path, config: &CoreConfig) -> FfmpegCommand {
    let profile = &config.profile;
    let mut cmd = FfmpegCommand::new_with_path(&config.ffmpeg_path);
    cmd.arg("-hide_banner");
    cmd.arg("-nostdin");
    cmd.arg("-y");
    cmd.input(source);
    cmd.args(["-c:v", profile.video_codec.as_str()]);
    cmd.args(["-crf", &profile.crf.to_string()]);
    cmd.args(["-preset", profile.preset.as_str()]);
    cmd.output(dest);
    cmd
}

/// Returns the program followed by its arguments, for logging and matching.
pub fn command_line(cmd: &mut FfmpegCommand) -> Vec<String> {
    let inner = cmd.as_inner();
    std::iter::once(inner.get_program())
        .chain(inner.get_args())
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}
