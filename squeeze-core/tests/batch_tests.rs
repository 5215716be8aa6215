// squeeze-core/tests/batch_tests.rs

use squeeze_core::config::{CoreConfig, CoreConfigBuilder};
use squeeze_core::error::FailureKind;
use squeeze_core::events::{Event, EventHandler};
use squeeze_core::external::mocks::{MockDurationProbe, MockFfmpegSpawner};
use squeeze_core::processing::{BatchOrchestrator, CancellationToken, JobId, JobStatus, MediaFile};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::{TempDir, tempdir};

const PROGRESS_5S: &str =
    "frame=  120 fps= 24 q=28.0 size=  256kB time=00:00:05.00 bitrate= 419.4kbits/s speed=1.0x";
const PROGRESS_10S: &str =
    "frame=  240 fps= 24 q=28.0 size=  512kB time=00:00:10.00 bitrate= 419.4kbits/s speed=1.0x";

/// Records every event for later assertions.
#[derive(Default)]
struct Recorder(Mutex<Vec<Event>>);

impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    /// (job, state) pairs in emission order.
    fn transitions(&self) -> Vec<(JobId, JobStatus)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::JobStateChanged { job_id, state, .. } => Some((job_id, state)),
                _ => None,
            })
            .collect()
    }
}

impl EventHandler for Recorder {
    fn handle(&self, event: &Event) {
        self.0.lock().unwrap().push(event.clone());
    }
}

struct Fixture {
    _input: TempDir,
    output: TempDir,
    files: Vec<MediaFile>,
}

fn fixture(names: &[&str]) -> Fixture {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    let files = names
        .iter()
        .map(|name| {
            let source = input.path().join(name);
            std::fs::write(&source, b"dummy content").unwrap();
            let stem = Path::new(name).file_stem().unwrap().to_string_lossy().into_owned();
            MediaFile::new(source, output.path().join(format!("{stem}_compressed.mp4")))
        })
        .collect();
    Fixture {
        _input: input,
        output,
        files,
    }
}

fn orchestrator(
    probe: &MockDurationProbe,
    spawner: &MockFfmpegSpawner,
    config: CoreConfig,
) -> (BatchOrchestrator<MockDurationProbe, MockFfmpegSpawner>, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let orchestrator = BatchOrchestrator::new(probe.clone(), spawner.clone(), config)
        .with_handler(recorder.clone());
    (orchestrator, recorder)
}

#[test]
fn test_all_jobs_succeed_in_order() {
    let fx = fixture(&["first.mp4", "second.mkv", "third.avi"]);
    let probe = MockDurationProbe::new();
    let spawner = MockFfmpegSpawner::new();
    for file in &fx.files {
        probe.expect_duration(&file.source_path, 20.0);
    }
    spawner.add_success_expectation("first.mp4", &[PROGRESS_5S, PROGRESS_10S], true);
    spawner.add_success_expectation("second.mkv", &[PROGRESS_5S], true);
    spawner.add_success_expectation("third.avi", &[], true);

    let config = CoreConfig::new(fx.output.path().to_path_buf());
    let (orchestrator, recorder) = orchestrator(&probe, &spawner, config);
    let summary = orchestrator.run(&fx.files);

    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 0);
    assert!(summary.all_succeeded());

    // Job i+1 leaves Pending only after job i is terminal
    let transitions = recorder.transitions();
    let mut expected = Vec::new();
    for id in 0..3 {
        expected.push((JobId(id), JobStatus::Probing));
        expected.push((JobId(id), JobStatus::Running));
        expected.push((JobId(id), JobStatus::Succeeded));
    }
    assert_eq!(transitions, expected);

    let sources: Vec<PathBuf> = fx.files.iter().map(|f| f.source_path.clone()).collect();
    assert_eq!(probe.get_calls(), sources);

    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].iter().any(|a| a.ends_with("first.mp4")));
    assert!(calls[0].last().unwrap().ends_with("first_compressed.mp4"));

    assert!(matches!(recorder.events().first(), Some(Event::BatchStarted { total: 3 })));
    assert!(matches!(recorder.events().last(), Some(Event::BatchComplete { .. })));
}

#[test]
fn test_progress_events_report_percent_and_eta() {
    let fx = fixture(&["clip.mov"]);
    let probe = MockDurationProbe::new();
    let spawner = MockFfmpegSpawner::new();
    probe.expect_duration(&fx.files[0].source_path, 20.0);
    spawner.add_success_expectation(
        "clip.mov",
        &["Input #0, mov,mp4, from 'clip.mov':", PROGRESS_5S, "garbage time=xx:yy", PROGRESS_10S],
        false,
    );

    let (orchestrator, recorder) = orchestrator(&probe, &spawner, CoreConfig::default());
    orchestrator.run(&fx.files);

    let progress: Vec<(f64, f64, f64)> = recorder
        .events()
        .into_iter()
        .filter_map(|event| match event {
            Event::JobProgress {
                percent,
                elapsed_media_seconds,
                total_duration_seconds,
                ..
            } => Some((percent, elapsed_media_seconds, total_duration_seconds)),
            _ => None,
        })
        .collect();

    assert_eq!(progress, vec![(25.0, 5.0, 20.0), (50.0, 10.0, 20.0)]);
}

#[test]
fn test_percent_clamped_when_encoder_overshoots() {
    let fx = fixture(&["short.mp4"]);
    let probe = MockDurationProbe::new();
    let spawner = MockFfmpegSpawner::new();
    probe.expect_duration(&fx.files[0].source_path, 8.0);
    spawner.add_success_expectation("short.mp4", &[PROGRESS_10S], false);

    let (orchestrator, recorder) = orchestrator(&probe, &spawner, CoreConfig::default());
    orchestrator.run(&fx.files);

    let percents: Vec<f64> = recorder
        .events()
        .into_iter()
        .filter_map(|event| match event {
            Event::JobProgress { percent, eta_seconds, .. } => {
                assert_eq!(eta_seconds, 0);
                Some(percent)
            }
            _ => None,
        })
        .collect();
    assert_eq!(percents, vec![100.0]);
}

#[test]
fn test_probe_failure_does_not_stop_batch() {
    let fx = fixture(&["one.mp4", "two.mp4", "three.mp4"]);
    let probe = MockDurationProbe::new();
    let spawner = MockFfmpegSpawner::new();
    probe.expect_duration(&fx.files[0].source_path, 30.0);
    probe.expect_failure(&fx.files[1].source_path, "moov atom not found");
    probe.expect_duration(&fx.files[2].source_path, 30.0);
    spawner.add_success_expectation("one.mp4", &[PROGRESS_5S], false);
    spawner.add_success_expectation("three.mp4", &[PROGRESS_5S], false);

    let (orchestrator, recorder) = orchestrator(&probe, &spawner, CoreConfig::default());
    let summary = orchestrator.run(&fx.files);

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.outcomes[0].status, JobStatus::Succeeded);
    assert_eq!(summary.outcomes[1].status, JobStatus::Failed);
    assert_eq!(summary.outcomes[2].status, JobStatus::Succeeded);

    let error = summary.outcomes[1].error.as_ref().unwrap();
    assert_eq!(error.kind, FailureKind::Probe);
    assert!(error.message.contains("moov atom not found"));

    // The encoder is never spawned for the failed probe
    assert_eq!(spawner.get_received_calls().len(), 2);
    assert!(recorder.transitions().contains(&(JobId(1), JobStatus::Failed)));
    assert!(!recorder.transitions().contains(&(JobId(1), JobStatus::Running)));
}

#[test]
fn test_zero_duration_is_a_probe_failure() {
    let fx = fixture(&["empty.mkv"]);
    let probe = MockDurationProbe::new();
    let spawner = MockFfmpegSpawner::new();
    probe.expect_duration(&fx.files[0].source_path, 0.0);

    let (orchestrator, _recorder) = orchestrator(&probe, &spawner, CoreConfig::default());
    let summary = orchestrator.run(&fx.files);

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.outcomes[0].error.as_ref().unwrap().kind, FailureKind::Probe);
    assert!(spawner.get_received_calls().is_empty());
}

#[test]
fn test_spawn_failure_marks_job_failed() {
    let fx = fixture(&["a.mp4", "b.mp4"]);
    let probe = MockDurationProbe::new();
    let spawner = MockFfmpegSpawner::new();
    probe.expect_duration(&fx.files[0].source_path, 10.0);
    probe.expect_duration(&fx.files[1].source_path, 10.0);
    spawner.add_spawn_error_expectation("a.mp4", io::ErrorKind::NotFound);
    spawner.add_success_expectation("b.mp4", &[], false);

    let (orchestrator, recorder) = orchestrator(&probe, &spawner, CoreConfig::default());
    let summary = orchestrator.run(&fx.files);

    assert_eq!(summary.outcomes[0].status, JobStatus::Failed);
    assert_eq!(summary.outcomes[0].error.as_ref().unwrap().kind, FailureKind::Spawn);
    assert_eq!(summary.outcomes[1].status, JobStatus::Succeeded);

    let first_job: Vec<JobStatus> = recorder
        .transitions()
        .into_iter()
        .filter(|(id, _)| *id == JobId(0))
        .map(|(_, state)| state)
        .collect();
    assert_eq!(first_job, vec![JobStatus::Probing, JobStatus::Running, JobStatus::Failed]);
}

#[test]
fn test_exit_error_keeps_partial_output_by_default() {
    let fx = fixture(&["broken.mp4"]);
    let probe = MockDurationProbe::new();
    let spawner = MockFfmpegSpawner::new();
    probe.expect_duration(&fx.files[0].source_path, 10.0);
    spawner.add_exit_error_expectation("broken.mp4", &[PROGRESS_5S, "Conversion failed!"], 1);

    let config = CoreConfig::new(fx.output.path().to_path_buf());
    let (orchestrator, _recorder) = orchestrator(&probe, &spawner, config);
    let summary = orchestrator.run(&fx.files);

    let error = summary.outcomes[0].error.as_ref().unwrap();
    assert_eq!(error.kind, FailureKind::EncodeRuntime);
    assert!(error.message.contains("Conversion failed!"));
    assert!(fx.files[0].dest_path.exists());
}

#[test]
fn test_exit_error_removes_partial_output_when_enabled() {
    let fx = fixture(&["broken.mp4"]);
    let probe = MockDurationProbe::new();
    let spawner = MockFfmpegSpawner::new();
    probe.expect_duration(&fx.files[0].source_path, 10.0);
    spawner.add_exit_error_expectation("broken.mp4", &[PROGRESS_5S], 1);

    let config = CoreConfigBuilder::new()
        .output_dir(fx.output.path())
        .remove_partial_output(true)
        .build();
    let (orchestrator, _recorder) = orchestrator(&probe, &spawner, config);
    let summary = orchestrator.run(&fx.files);

    assert_eq!(summary.failed, 1);
    assert!(!fx.files[0].dest_path.exists());
}

#[test]
fn test_spawn_failure_keeps_existing_destination() {
    let fx = fixture(&["a.mp4"]);
    let probe = MockDurationProbe::new();
    let spawner = MockFfmpegSpawner::new();
    probe.expect_duration(&fx.files[0].source_path, 10.0);
    spawner.add_spawn_error_expectation("a.mp4", io::ErrorKind::NotFound);

    // Output of an earlier run that this job never got to overwrite
    let dest = &fx.files[0].dest_path;
    std::fs::write(dest, b"earlier good encode").unwrap();

    let config = CoreConfigBuilder::new()
        .output_dir(fx.output.path())
        .remove_partial_output(true)
        .build();
    let (orchestrator, _recorder) = orchestrator(&probe, &spawner, config);
    let summary = orchestrator.run(&fx.files);

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.outcomes[0].error.as_ref().unwrap().kind, FailureKind::Spawn);
    assert_eq!(std::fs::read(dest).unwrap(), b"earlier good encode");
}

#[test]
fn test_stream_read_error_leaves_outcome_to_exit_status() {
    let fx = fixture(&["ok.mp4", "bad.mp4"]);
    let probe = MockDurationProbe::new();
    let spawner = MockFfmpegSpawner::new();
    probe.expect_duration(&fx.files[0].source_path, 20.0);
    probe.expect_duration(&fx.files[1].source_path, 20.0);
    spawner.add_read_error_expectation("ok.mp4", &[PROGRESS_5S], 0);
    spawner.add_read_error_expectation("bad.mp4", &[PROGRESS_5S, "Conversion failed!"], 1);

    let (orchestrator, recorder) = orchestrator(&probe, &spawner, CoreConfig::default());
    let summary = orchestrator.run(&fx.files);

    assert_eq!(summary.outcomes[0].status, JobStatus::Succeeded);
    assert_eq!(summary.outcomes[1].status, JobStatus::Failed);
    let error = summary.outcomes[1].error.as_ref().unwrap();
    assert_eq!(error.kind, FailureKind::EncodeRuntime);
    assert!(error.message.contains("Conversion failed!"));

    // Lines read before the error still count as progress
    let progress_count = recorder
        .events()
        .iter()
        .filter(|e| matches!(e, Event::JobProgress { .. }))
        .count();
    assert_eq!(progress_count, 2);
}

#[test]
fn test_cancelled_before_start_fails_every_job() {
    let fx = fixture(&["a.mp4", "b.mp4"]);
    let probe = MockDurationProbe::new();
    let spawner = MockFfmpegSpawner::new();

    let token = CancellationToken::new();
    token.cancel();
    let (orchestrator, _recorder) = orchestrator(&probe, &spawner, CoreConfig::default());
    let summary = orchestrator.with_cancellation(token).run(&fx.files);

    assert_eq!(summary.failed, 2);
    assert!(summary
        .outcomes
        .iter()
        .all(|o| o.error.as_ref().unwrap().kind == FailureKind::Cancelled));
    assert!(probe.get_calls().is_empty());
    assert!(spawner.get_received_calls().is_empty());
}

/// Requests cancellation as soon as the first progress update arrives.
struct CancelOnProgress(CancellationToken);

impl EventHandler for CancelOnProgress {
    fn handle(&self, event: &Event) {
        if matches!(event, Event::JobProgress { .. }) {
            self.0.cancel();
        }
    }
}

#[test]
fn test_cancel_during_encode_stops_running_and_pending_jobs() {
    let fx = fixture(&["long.mp4", "next.mp4"]);
    let probe = MockDurationProbe::new();
    let spawner = MockFfmpegSpawner::new();
    probe.expect_duration(&fx.files[0].source_path, 60.0);
    probe.expect_duration(&fx.files[1].source_path, 60.0);
    spawner.add_success_expectation("long.mp4", &[PROGRESS_5S, PROGRESS_10S], false);

    let token = CancellationToken::new();
    let (orchestrator, recorder) = orchestrator(&probe, &spawner, CoreConfig::default());
    let orchestrator = orchestrator
        .with_cancellation(token.clone())
        .with_handler(Arc::new(CancelOnProgress(token)));
    let summary = orchestrator.run(&fx.files);

    assert_eq!(summary.failed, 2);
    assert_eq!(summary.outcomes[0].error.as_ref().unwrap().kind, FailureKind::Cancelled);
    assert_eq!(summary.outcomes[1].error.as_ref().unwrap().kind, FailureKind::Cancelled);
    assert_eq!(probe.get_calls().len(), 1);

    let progress_count = recorder
        .events()
        .iter()
        .filter(|e| matches!(e, Event::JobProgress { .. }))
        .count();
    assert_eq!(progress_count, 1);
}

#[test]
fn test_plan_jobs_derives_destinations() {
    let probe = MockDurationProbe::new();
    let spawner = MockFfmpegSpawner::new();
    let config = CoreConfig::new(PathBuf::from("/out"));
    let (orchestrator, _recorder) = orchestrator(&probe, &spawner, config);

    let files = orchestrator
        .plan_jobs(&[PathBuf::from("/in/b.MKV"), PathBuf::from("/in/a.mov")])
        .unwrap();
    assert_eq!(files[0].dest_path, PathBuf::from("/out/b_compressed.mp4"));
    assert_eq!(files[1].dest_path, PathBuf::from("/out/a_compressed.mp4"));
}
