// ============================================================================
// squeeze-core/src/processing/orchestrator.rs
// ============================================================================
//
// BATCH ORCHESTRATION: Sequential encoding of an ordered set of files
//
// WORKFLOW (per job, strictly one at a time and in enqueue order):
// 1. Pending -> Probing: ask the DurationProbe for the total duration
// 2. Probing -> Running: build the fixed-profile command and spawn the encoder
// 3. Feed every diagnostic line through the progress parser, updating percent
//    and ETA on each match
// 4. Running -> Succeeded/Failed from the exit status
//
// A failed job never stops the batch. Every state change and progress update
// is emitted as an Event and, when a snapshot slot is attached, republished
// as a cloned BatchRun.

use super::batch::{BatchRun, BatchSummary, CancellationToken};
use super::job::{EncodingJob, JobId, MediaFile};
use crate::config::CoreConfig;
use crate::error::{
    CoreError, CoreResult, FailureKind, JobError, command_failed_error, probe_error,
};
use crate::events::{Event, EventDispatcher, EventHandler};
use crate::external::{
    DurationProbe, FfmpegProcess, FfmpegSpawner, build_encode_command, command_line,
};
use crate::progress::parse_progress_line;
use crate::utils::destination_for;

use log::{debug, error, info, warn};

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Diagnostic lines kept for the failure message of a non-zero exit.
const STDERR_TAIL_LINES: usize = 5;

/// Where the worker republishes the batch state after every mutation.
#[derive(Clone, Copy)]
pub(crate) struct Snapshot<'a>(Option<&'a Mutex<BatchRun>>);

impl Snapshot<'_> {
    pub(crate) fn none() -> Self {
        Snapshot(None)
    }

    fn publish(&self, run: &BatchRun) {
        if let Some(slot) = self.0 {
            match slot.lock() {
                Ok(mut guard) => *guard = run.clone(),
                Err(_) => warn!("Batch snapshot lock poisoned; snapshot not updated"),
            }
        }
    }
}

impl<'a> From<&'a Mutex<BatchRun>> for Snapshot<'a> {
    fn from(slot: &'a Mutex<BatchRun>) -> Self {
        Snapshot(Some(slot))
    }
}

/// Runs batches of encodes with injected probe and encoder seams.
pub struct BatchOrchestrator<P: DurationProbe, S: FfmpegSpawner> {
    probe: P,
    spawner: S,
    config: CoreConfig,
    dispatcher: EventDispatcher,
    cancel: CancellationToken,
}

impl<P: DurationProbe, S: FfmpegSpawner> BatchOrchestrator<P, S> {
    pub fn new(probe: P, spawner: S, config: CoreConfig) -> Self {
        Self {
            probe,
            spawner,
            config,
            dispatcher: EventDispatcher::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.dispatcher.add_handler(handler);
    }

    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.add_handler(handler);
        self
    }

    /// Replaces the cancellation token, so a caller can keep a clone.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Pairs every source with its destination in the configured output folder.
    ///
    /// Order is preserved.
    pub fn plan_jobs(&self, sources: &[PathBuf]) -> CoreResult<Vec<MediaFile>> {
        self.config.validate()?;
        sources
            .iter()
            .map(|source| {
                let dest = destination_for(source, &self.config.output_dir, &self.config)?;
                Ok(MediaFile::new(source.clone(), dest))
            })
            .collect()
    }

    /// Encodes `files` one after another and returns the summary.
    ///
    /// Always runs to completion: every job ends `Succeeded` or `Failed`.
    pub fn run(&self, files: &[MediaFile]) -> BatchSummary {
        self.run_with_snapshot(files, Snapshot::none())
    }

    pub(crate) fn run_with_snapshot(
        &self,
        files: &[MediaFile],
        snapshot: Snapshot<'_>,
    ) -> BatchSummary {
        let started = Instant::now();
        let jobs = files
            .iter()
            .enumerate()
            .map(|(i, media)| EncodingJob::new(JobId(i), media.clone()))
            .collect();
        let mut run = BatchRun::new(jobs);

        info!("Starting batch of {} file(s)", run.len());
        snapshot.publish(&run);
        self.dispatcher.emit(Event::BatchStarted { total: run.len() });

        for index in 0..run.len() {
            run.current_index = Some(index);
            if self.cancel.is_cancelled() {
                let cancelled =
                    JobError::new(FailureKind::Cancelled, "batch cancelled before job started");
                self.advance(&mut run, index, snapshot, |job| job.fail(cancelled));
                continue;
            }
            self.run_job(&mut run, index, snapshot);
        }

        run.current_index = None;
        snapshot.publish(&run);

        let summary = BatchSummary::from_run(&run, started.elapsed());
        info!(
            "Batch complete: {} succeeded, {} failed of {}",
            summary.succeeded, summary.failed, summary.total
        );
        self.dispatcher.emit(Event::BatchComplete {
            summary: summary.clone(),
        });
        summary
    }

    /// Applies one transition to job `index` and announces it.
    fn advance<F>(&self, run: &mut BatchRun, index: usize, snapshot: Snapshot<'_>, step: F)
    where
        F: FnOnce(&mut EncodingJob) -> CoreResult<()>,
    {
        if let Err(e) = step(&mut run.jobs[index]) {
            error!("Job {}: {e}", run.jobs[index].id());
            return;
        }
        snapshot.publish(run);

        let job = &run.jobs[index];
        self.dispatcher.emit(Event::JobStateChanged {
            job_id: job.id(),
            index: index + 1,
            total: run.len(),
            source: job.source().display().to_string(),
            state: job.status(),
            error: job.last_error().cloned(),
        });
    }

    fn fail_job(&self, run: &mut BatchRun, index: usize, snapshot: Snapshot<'_>, err: &CoreError) {
        warn!("Job {} failed: {err}", run.jobs[index].id());
        let job_error = JobError::from(err);
        self.advance(run, index, snapshot, |job| job.fail(job_error));
    }

    fn run_job(&self, run: &mut BatchRun, index: usize, snapshot: Snapshot<'_>) {
        let media = run.jobs[index].media().clone();
        info!(
            "Compressing ({}/{}): {}",
            index + 1,
            run.len(),
            media.source_path.display()
        );

        self.advance(run, index, snapshot, EncodingJob::begin_probe);

        let duration = match self.probe.probe(&media.source_path) {
            Ok(seconds) if seconds.is_finite() && seconds > 0.0 => seconds,
            Ok(seconds) => {
                let err = probe_error(
                    media.source_path.display(),
                    format!("unusable duration {seconds}"),
                );
                self.fail_job(run, index, snapshot, &err);
                return;
            }
            Err(e) => {
                self.fail_job(run, index, snapshot, &e);
                return;
            }
        };
        debug!("Probed duration of {}: {duration:.2}s", media.source_path.display());

        if self.cancel.is_cancelled() {
            self.fail_job(run, index, snapshot, &CoreError::Cancelled);
            return;
        }

        self.advance(run, index, snapshot, |job| job.start_running(duration));

        let (process, cmd_line) = match self.spawn_encoder(&media) {
            Ok(spawned) => spawned,
            Err(e) => {
                // Nothing was written, so an existing destination stays
                self.fail_job(run, index, snapshot, &e);
                return;
            }
        };

        match self.stream_encode(run, index, snapshot, &media, process, cmd_line) {
            Ok(()) => self.advance(run, index, snapshot, EncodingJob::succeed),
            Err(e) => {
                self.fail_job(run, index, snapshot, &e);
                if self.config.remove_partial_output {
                    self.remove_partial(&media);
                }
            }
        }
    }

    /// Builds the fixed-profile command and starts the encoder.
    fn spawn_encoder(&self, media: &MediaFile) -> CoreResult<(S::Process, String)> {
        let mut cmd = build_encode_command(&media.source_path, &media.dest_path, &self.config);
        let cmd_line = command_line(&mut cmd).join(" ");
        debug!("Encoder command: {cmd_line}");

        let process = self.spawner.spawn(cmd)?;
        Ok((process, cmd_line))
    }

    /// Streams progress from a running encoder and reports the exit outcome.
    fn stream_encode(
        &self,
        run: &mut BatchRun,
        index: usize,
        snapshot: Snapshot<'_>,
        media: &MediaFile,
        mut process: S::Process,
        cmd_line: String,
    ) -> CoreResult<()> {
        let started = Instant::now();
        let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

        let streamed = process.handle_stderr_lines(|line| {
            if self.cancel.is_cancelled() {
                return Err(CoreError::Cancelled);
            }
            if tail.len() == STDERR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line.to_string());

            let Some(sample) = parse_progress_line(line) else {
                return Ok(());
            };
            let job = &mut run.jobs[index];
            job.apply_sample(&sample, started.elapsed().as_secs_f64())?;
            snapshot.publish(run);

            let job = &run.jobs[index];
            self.dispatcher.emit(Event::JobProgress {
                job_id: job.id(),
                percent: job.percent().unwrap_or_default(),
                eta_seconds: job.eta_seconds().unwrap_or_default(),
                elapsed_media_seconds: sample.elapsed_media_seconds,
                total_duration_seconds: job.total_duration_seconds(),
            });
            Ok(())
        });

        match streamed {
            Ok(()) => {}
            Err(CoreError::Cancelled) => {
                info!("Cancelling encode of {}", media.source_path.display());
                if let Err(e) = process.kill() {
                    warn!("Failed to kill encoder: {e}");
                }
                if let Err(e) = process.wait() {
                    warn!("Failed to reap cancelled encoder: {e}");
                }
                return Err(CoreError::Cancelled);
            }
            Err(e) => warn!("Stopped reading encoder output early: {e}"),
        }

        let status = process.wait()?;
        if status.success() {
            Ok(())
        } else {
            let stderr = Vec::from(tail).join("\n");
            Err(command_failed_error(cmd_line, status, stderr))
        }
    }

    fn remove_partial(&self, media: &MediaFile) {
        let dest = &media.dest_path;
        if !dest.exists() {
            return;
        }
        match fs::remove_file(dest) {
            Ok(()) => info!("Removed partial output {}", dest.display()),
            Err(e) => warn!("Failed to remove partial output {}: {e}", dest.display()),
        }
    }
}
