// ============================================================================
// squeeze-cli/src/render.rs
// ============================================================================
//
// RENDERERS: Presentation of core events
//
// Both renderers implement squeeze-core's EventHandler and only read the
// events they are given. They are driven from the CLI thread while the batch
// runs on its worker.
//
// KEY COMPONENTS:
// - TerminalRenderer: styled lines plus an indicatif bar per job
// - JsonRenderer: one JSON object per event, for machine consumers

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use squeeze_core::utils::get_filename_safe;
use squeeze_core::{BatchSummary, Event, EventHandler, JobError, JobStatus, format_duration};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Bar resolution: hundredths of a percent.
const BAR_LENGTH: u64 = 10_000;

/// File name portion of a source path, for display.
fn display_name(source: &str) -> String {
    get_filename_safe(Path::new(source)).unwrap_or_else(|_| source.to_string())
}

/// The "Progress: xx.xx% | ETA: Ns" line shown beside the bar.
pub fn progress_message(percent: f64, eta_seconds: u64) -> String {
    format!("Progress: {percent:.2}% | ETA: {eta_seconds}s")
}

/// Whether a batch should be reported as a failure by the process exit code.
pub fn batch_failed(summary: &BatchSummary) -> bool {
    !summary.all_succeeded()
}

/// Closing heading for a finished batch.
pub fn summary_heading(summary: &BatchSummary) -> &'static str {
    if batch_failed(summary) {
        "Compression finished with failures"
    } else {
        "All videos compressed"
    }
}

/// Human-friendly renderer that prints concise text output.
pub struct TerminalRenderer {
    progress: Mutex<Option<ProgressBar>>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            progress: Mutex::new(None),
        }
    }

    fn start_progress(&self) {
        self.finish_progress();
        let pb = ProgressBar::new(BAR_LENGTH);
        if let Ok(bar_style) = ProgressStyle::default_bar().template("  [{bar:40}] {msg}") {
            pb.set_style(bar_style.progress_chars("=> "));
        }
        pb.set_message(progress_message(0.0, 0));
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut guard) = self.progress.lock() {
            *guard = Some(pb);
        }
    }

    fn update_progress(&self, percent: f64, eta_seconds: u64) {
        if let Ok(guard) = self.progress.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_position((percent.clamp(0.0, 100.0) * 100.0) as u64);
                pb.set_message(progress_message(percent, eta_seconds));
            }
        }
    }

    fn finish_progress(&self) {
        if let Ok(mut guard) = self.progress.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn job_finished(&self, source: &str, state: JobStatus, error: Option<&JobError>) {
        self.finish_progress();
        let name = display_name(source);
        match (state, error) {
            (JobStatus::Succeeded, _) => {
                println!("  {} {}", style("✓").green().bold(), name);
            }
            (_, Some(error)) => {
                println!("  {} {}: {}", style("✗").red().bold(), name, style(error).red());
            }
            (_, None) => {
                println!("  {} {}", style("✗").red().bold(), name);
            }
        }
    }

    fn batch_complete(&self, summary: &BatchSummary) {
        self.finish_progress();
        let heading = summary_heading(summary);
        if batch_failed(summary) {
            println!("\n{}", style(heading).bold().yellow());
        } else {
            println!("\n{}", style(heading).bold().cyan());
        }
        println!(
            "  {} succeeded, {} failed of {}",
            style(summary.succeeded.to_string()).green().bold(),
            style(summary.failed.to_string()).red().bold(),
            summary.total
        );
        println!("  Time: {}", format_duration(summary.wall_time_seconds));
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for TerminalRenderer {
    fn handle(&self, event: &Event) {
        match event {
            Event::BatchStarted { total } => {
                println!("\n{}", style("BATCH").bold().cyan());
                println!("  {total} file(s) queued");
            }
            Event::JobStateChanged {
                index,
                total,
                source,
                state,
                error,
                ..
            } => match state {
                JobStatus::Pending => {}
                JobStatus::Probing => {
                    println!(
                        "\n{} {}",
                        style(format!("Compressing ({index}/{total}):")).bold(),
                        display_name(source)
                    );
                }
                JobStatus::Running => self.start_progress(),
                JobStatus::Succeeded | JobStatus::Failed => {
                    self.job_finished(source, *state, error.as_ref());
                }
            },
            Event::JobProgress {
                percent,
                eta_seconds,
                ..
            } => self.update_progress(*percent, *eta_seconds),
            Event::BatchComplete { summary } => self.batch_complete(summary),
        }
    }
}

/// JSON lines renderer. Progress is emitted once per whole percent.
pub struct JsonRenderer {
    writer: Mutex<Box<dyn Write + Send>>,
    last_progress_bucket: Mutex<i64>,
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            last_progress_bucket: Mutex::new(-1),
        }
    }

    fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_value(&self, value: Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{value}");
            let _ = writer.flush();
        }
    }

    /// True when `percent` lands in a new whole-percent bucket.
    fn should_emit_progress(&self, percent: f64) -> bool {
        let bucket = percent.floor() as i64;
        match self.last_progress_bucket.lock() {
            Ok(mut last) if bucket > *last => {
                *last = bucket;
                true
            }
            Ok(_) => false,
            Err(_) => true,
        }
    }

    fn reset_progress(&self) {
        if let Ok(mut last) = self.last_progress_bucket.lock() {
            *last = -1;
        }
    }
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for JsonRenderer {
    fn handle(&self, event: &Event) {
        match event {
            Event::JobProgress { percent, .. } if !self.should_emit_progress(*percent) => return,
            Event::JobStateChanged { .. } => self.reset_progress(),
            _ => {}
        }

        let mut value = match serde_json::to_value(event) {
            Ok(value) => value,
            Err(e) => json!({ "type": "error", "message": e.to_string() }),
        };
        if let Value::Object(map) = &mut value {
            map.insert("timestamp".to_string(), json!(Self::timestamp()));
        }
        self.write_value(value);
    }
}
