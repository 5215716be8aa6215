// squeeze-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and when the "test-mocks" feature is enabled.
// Everything here is `Send + Sync` so mocks can drive a batch on a worker thread.

use super::{DurationProbe, FfmpegProcess, FfmpegSpawner, command_line};
use crate::error::{CoreError, CoreResult, probe_error};
use ffmpeg_sidecar::command::FfmpegCommand;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    // Raw wait status: the exit code lives in the high byte
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

/// Mock implementation of FfmpegProcess.
#[derive(Debug, Clone)]
pub struct MockFfmpegProcess {
    /// Lines replayed to the stderr handler
    pub stderr_lines: Vec<String>,
    /// Exit status returned from wait
    pub exit_status: ExitStatus,
    /// Set once kill has been called
    pub killed: bool,
    /// Read error raised after the replayed lines
    pub read_error: Option<io::ErrorKind>,
}

impl MockFfmpegProcess {
    pub fn new(stderr_lines: Vec<String>, exit_code: i32) -> Self {
        Self {
            stderr_lines,
            exit_status: exit_status(exit_code),
            killed: false,
            read_error: None,
        }
    }

    /// Ends the diagnostic stream with a read error of `kind`.
    pub fn with_read_error(mut self, kind: io::ErrorKind) -> Self {
        self.read_error = Some(kind);
        self
    }
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_stderr_lines<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(&str) -> CoreResult<()>,
    {
        for line in &self.stderr_lines {
            handler(line)?;
        }
        match self.read_error {
            Some(kind) => Err(CoreError::Io(io::Error::new(kind, "mock stderr closed"))),
            None => Ok(()),
        }
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        if self.killed {
            return Ok(exit_status(255));
        }
        Ok(self.exit_status)
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.killed = true;
        Ok(())
    }
}

fn owned_lines(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|l| l.to_string()).collect()
}

enum MockSpawnResult {
    Process(MockFfmpegProcess),
    SpawnError(io::ErrorKind),
}

/// Represents an expected ffmpeg command call and its mock result.
struct MockFfmpegExpectation {
    arg_pattern: String,
    result: MockSpawnResult,
    create_dummy_output: bool,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
///
/// Each spawn consumes the first expectation whose pattern appears in any
/// argument of the command line. Unmatched spawns fail the test.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Arc<Mutex<VecDeque<MockFfmpegExpectation>>>,
    received_calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    fn push(&self, arg_pattern: &str, result: MockSpawnResult, create_dummy_output: bool) {
        let expectation = MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            create_dummy_output,
        };
        self.expectations.lock().unwrap().push_back(expectation);
    }

    /// Expect a spawn that replays `lines` and exits with status 0.
    pub fn add_success_expectation(
        &self,
        arg_pattern: &str,
        lines: &[&str],
        create_dummy_output: bool,
    ) {
        let process = MockFfmpegProcess::new(owned_lines(lines), 0);
        self.push(arg_pattern, MockSpawnResult::Process(process), create_dummy_output);
    }

    /// Expect a spawn that replays `lines`, writes a dummy destination, then
    /// exits with `exit_code`.
    pub fn add_exit_error_expectation(&self, arg_pattern: &str, lines: &[&str], exit_code: i32) {
        let process = MockFfmpegProcess::new(owned_lines(lines), exit_code);
        self.push(arg_pattern, MockSpawnResult::Process(process), true);
    }

    /// Expect a spawn whose diagnostic stream fails with a read error after
    /// `lines`, then exits with `exit_code`.
    pub fn add_read_error_expectation(&self, arg_pattern: &str, lines: &[&str], exit_code: i32) {
        let process = MockFfmpegProcess::new(owned_lines(lines), exit_code)
            .with_read_error(io::ErrorKind::BrokenPipe);
        self.push(arg_pattern, MockSpawnResult::Process(process), false);
    }

    /// Expect a spawn that cannot start at all.
    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, kind: io::ErrorKind) {
        self.push(arg_pattern, MockSpawnResult::SpawnError(kind), false);
    }

    /// Command lines received so far, program first.
    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.lock().unwrap().clone()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args = command_line(&mut cmd);
        self.received_calls.lock().unwrap().push(args.clone());

        let expectation = {
            let mut expectations = self.expectations.lock().unwrap();
            let found = expectations
                .iter()
                .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));
            found.and_then(|index| expectations.remove(index))
        };

        let Some(expectation) = expectation else {
            panic!("MockFfmpegSpawner: No expectation found for command args: {args:?}");
        };
        log::info!(
            "MockFfmpegSpawner: Matched expectation with pattern '{}'",
            expectation.arg_pattern
        );

        match expectation.result {
            MockSpawnResult::Process(process) => {
                if expectation.create_dummy_output {
                    if let Some(output_path) = args.last().map(PathBuf::from) {
                        if let Some(parent) = output_path.parent() {
                            let _ = std::fs::create_dir_all(parent);
                        }
                        if let Err(e) = std::fs::write(&output_path, b"partial") {
                            log::error!(
                                "MockFfmpegSpawner failed to create dummy output {}: {e}",
                                output_path.display()
                            );
                        }
                    }
                }
                Ok(process)
            }
            MockSpawnResult::SpawnError(kind) => Err(CoreError::Spawn(
                "ffmpeg (mock)".to_string(),
                io::Error::from(kind),
            )),
        }
    }
}

/// Mock implementation of DurationProbe keyed by path.
#[derive(Clone, Default)]
pub struct MockDurationProbe {
    results: Arc<Mutex<HashMap<PathBuf, Result<f64, String>>>>,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockDurationProbe {
    pub fn new() -> Self {
        Default::default()
    }

    /// Probe of `path` returns `seconds`.
    pub fn expect_duration(&self, path: &Path, seconds: f64) {
        self.results.lock().unwrap().insert(path.to_path_buf(), Ok(seconds));
    }

    /// Probe of `path` fails with `reason`.
    pub fn expect_failure(&self, path: &Path, reason: &str) {
        self.results.lock().unwrap().insert(path.to_path_buf(), Err(reason.to_string()));
    }

    /// Paths probed so far, in call order.
    pub fn get_calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

impl DurationProbe for MockDurationProbe {
    fn probe(&self, path: &Path) -> CoreResult<f64> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        match self.results.lock().unwrap().get(path) {
            Some(Ok(seconds)) => Ok(*seconds),
            Some(Err(reason)) => Err(probe_error(path.display(), reason.clone())),
            None => Err(probe_error(path.display(), "no mock expectation set")),
        }
    }
}
