//! Implementation of the 'compress' subcommand.
//!
//! Resolves the input selection, checks that ffmpeg and ffprobe are
//! available, starts the batch on a worker thread, and forwards every event
//! it publishes to the chosen renderer.

use crate::cli::CompressArgs;
use crate::error::{CliErrorContext, CliResult};

use squeeze_core::{
    BatchOrchestrator, BatchSummary, CoreConfig, CoreConfigBuilder, CrateFfprobeExecutor,
    EventHandler, InputSelection, SidecarSpawner, check_dependency, spawn_batch,
};

use log::{debug, info};
use std::fs;

/// Builds the core configuration from CLI arguments.
pub fn create_core_config(args: &CompressArgs) -> CliResult<CoreConfig> {
    let config = CoreConfigBuilder::new()
        .output_dir(args.output_dir.clone())
        .remove_partial_output(args.remove_partial)
        .ffmpeg_path(args.ffmpeg.clone())
        .build();
    config.validate()?;
    Ok(config)
}

/// Applies the input and output arguments to a fresh selection.
///
/// The output folder is created if it does not exist yet.
pub fn select_inputs(args: &CompressArgs) -> CliResult<InputSelection> {
    let mut selection = InputSelection::new();
    let eligible = selection.on_input_selected(&args.input_path)?;
    debug!("{eligible} eligible file(s) under {}", args.input_path.display());

    fs::create_dir_all(&args.output_dir).cli_with_context(|| {
        format!("Failed to create output folder {}", args.output_dir.display())
    })?;
    selection.on_output_folder_selected(&args.output_dir)?;
    Ok(selection)
}

/// Runs the compress command and returns the batch summary.
pub fn run_compress(args: CompressArgs, renderer: &dyn EventHandler) -> CliResult<BatchSummary> {
    let selection = select_inputs(&args)?;
    let config = create_core_config(&args)?;

    check_dependency(&config.ffmpeg_path)?;
    check_dependency("ffprobe")?;

    let files = selection.on_start_requested(&config)?;
    info!(
        "Compressing {} file(s) from {} into {}",
        files.len(),
        args.input_path.display(),
        config.output_dir.display()
    );

    let orchestrator = BatchOrchestrator::new(CrateFfprobeExecutor::new(), SidecarSpawner, config);
    let handle = spawn_batch(orchestrator, files)?;

    for event in handle.events() {
        renderer.handle(&event);
    }

    handle.join()
}
