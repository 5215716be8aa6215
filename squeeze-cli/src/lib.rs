//! Library component for the Squeeze CLI application.
//!
//! Argument definitions, logging setup, the `compress` command, and the
//! renderers that turn core events into terminal or JSON output.

/// Command-line interface definitions using clap
pub mod cli;

/// Command implementations for each subcommand
pub mod commands;

/// Error handling utilities for the CLI
pub mod error;

/// Logging setup and helper functions
pub mod logging;

/// Event renderers for the terminal and JSON lines
pub mod render;

// Re-exports for convenience
pub use cli::{Cli, Commands, CompressArgs, parse_cli, parse_cli_from};
pub use commands::compress::run_compress;
