//! Remaining-time estimation from wall-clock progress.

/// Estimates the seconds remaining for a job.
///
/// `remaining = elapsed_wall / percent * (100 - percent)`. A percent of zero
/// or below means nothing is known yet and yields `0.0`. The estimate is not
/// monotonic: a slow stretch of encoding can raise it again.
#[must_use]
pub fn estimate_remaining(elapsed_wall_seconds: f64, percent: f64) -> f64 {
    if percent <= 0.0 || !percent.is_finite() || !elapsed_wall_seconds.is_finite() {
        return 0.0;
    }
    let percent = percent.min(100.0);
    elapsed_wall_seconds.max(0.0) * (100.0 - percent) / percent
}

/// Truncates an estimate to whole seconds for display.
#[must_use]
pub fn eta_whole_seconds(remaining: f64) -> u64 {
    if remaining.is_finite() && remaining > 0.0 {
        remaining as u64
    } else {
        0
    }
}
