// ============================================================================
// squeeze-cli/src/logging.rs
// ============================================================================
//
// LOGGING: fern dispatch for the console and the per-run log file
//
// Every record at the run's level goes to LOG_DIR/squeeze_run_<ts>.log.
// Only warnings and errors reach stderr unless verbose output was requested,
// so log lines do not tear through the progress bar.
//
// Raw encoder output is logged at trace level under the `squeeze::encoder`
// target and is only enabled with -vv.

use crate::error::{CliErrorContext, CliResult};
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Maps the `-v` count to a level filter.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the global logger and returns the path of the run's log file.
pub fn setup_logging(log_dir: &Path, verbose: u8) -> CliResult<PathBuf> {
    fs::create_dir_all(log_dir)
        .cli_with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let log_path = log_dir.join(format!("squeeze_run_{}.log", get_timestamp()));
    let log_file = fern::log_file(&log_path)
        .cli_with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let level = level_for_verbosity(verbose);
    let console_level = if verbose > 0 { level } else { LevelFilter::Warn };

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    let file_dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ))
        })
        .chain(log_file);

    let console_dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!("{} {}", colors.color(record.level()), message))
        })
        .level(console_level)
        .chain(std::io::stderr());

    let encoder_level = if verbose > 1 {
        LevelFilter::Trace
    } else {
        LevelFilter::Off
    };

    fern::Dispatch::new()
        .level(level)
        .level_for("squeeze::encoder", encoder_level)
        .chain(file_dispatch)
        .chain(console_dispatch)
        .apply()
        .map_err(|e| {
            squeeze_core::CoreError::OperationFailed(format!("Failed to install logger: {e}"))
        })?;

    log::debug!("Logging to {}", log_path.display());
    Ok(log_path)
}
