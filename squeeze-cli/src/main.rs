//! Main entry point for the Squeeze CLI application.
//!
//! Parses arguments, sets up logging, picks a renderer, and runs the
//! requested command. Exits with status 1 when setup fails or any job in the
//! batch fails.

use squeeze_cli::logging::setup_logging;
use squeeze_cli::render::{JsonRenderer, TerminalRenderer, batch_failed};
use squeeze_cli::{Commands, parse_cli, run_compress};
use squeeze_core::EventHandler;

use console::style;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = parse_cli();

    let result = match cli.command {
        Commands::Compress(args) => {
            setup_logging(&args.log_dir(), cli.verbose).and_then(|log_path| {
                log::info!("Squeeze run started; log file {}", log_path.display());
                let renderer: Box<dyn EventHandler> = if args.json {
                    Box::new(JsonRenderer::new())
                } else {
                    Box::new(TerminalRenderer::new())
                };
                run_compress(args, renderer.as_ref())
            })
        }
    };

    match result {
        Ok(summary) if batch_failed(&summary) => {
            log::warn!("{} of {} job(s) failed", summary.failed, summary.total);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
