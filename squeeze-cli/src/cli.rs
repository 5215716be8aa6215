// squeeze-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{ArgAction, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Squeeze: batch video compression",
    long_about = "Compresses one video or every video in a folder with ffmpeg, one file at a time."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log detail (-v debug, -vv also logs raw encoder output)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compresses a video file, or every video in a folder, into an output folder
    Compress(CompressArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct CompressArgs {
    /// Input video file or folder of videos (.mp4, .mkv, .avi, .mov)
    #[arg(short = 'i', long = "input", required = true, value_name = "FILE|FOLDER")]
    pub input_path: PathBuf,

    /// Folder where compressed files will be saved (created if missing)
    #[arg(short = 'o', long = "output", required = true, value_name = "FOLDER")]
    pub output_dir: PathBuf,

    /// Optional: Directory for log files (defaults to FOLDER/logs)
    #[arg(short, long, value_name = "LOG_DIR", env = "SQUEEZE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Emit one JSON object per event on stdout instead of a progress bar
    #[arg(long)]
    pub json: bool,

    /// Delete the partially written output of a failed job
    #[arg(long)]
    pub remove_partial: bool,

    /// ffmpeg executable to invoke
    #[arg(long, value_name = "PATH", env = "SQUEEZE_FFMPEG", default_value = "ffmpeg")]
    pub ffmpeg: String,
}

impl CompressArgs {
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.join("logs"))
    }
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

pub fn parse_cli_from<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::parse_from(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compress_basic_args() {
        let cli = parse_cli_from(["squeeze", "compress", "-i", "videos", "-o", "out"]);
        assert_eq!(cli.verbose, 0);

        let Commands::Compress(args) = cli.command;
        assert_eq!(args.input_path, PathBuf::from("videos"));
        assert_eq!(args.output_dir, PathBuf::from("out"));
        assert_eq!(args.log_dir(), PathBuf::from("out").join("logs"));
        assert!(!args.json);
        assert!(!args.remove_partial);
    }

    #[test]
    fn test_parse_compress_all_flags() {
        let cli = parse_cli_from([
            "squeeze",
            "-vv",
            "compress",
            "--input",
            "clip.mkv",
            "--output",
            "out",
            "--log-dir",
            "logs",
            "--json",
            "--remove-partial",
            "--ffmpeg",
            "/opt/ffmpeg",
        ]);
        assert_eq!(cli.verbose, 2);

        let Commands::Compress(args) = cli.command;
        assert_eq!(args.log_dir(), PathBuf::from("logs"));
        assert!(args.json);
        assert!(args.remove_partial);
        assert_eq!(args.ffmpeg, "/opt/ffmpeg");
    }

    #[test]
    fn test_input_and_output_are_required() {
        assert!(Cli::try_parse_from(["squeeze", "compress", "-i", "videos"]).is_err());
        assert!(Cli::try_parse_from(["squeeze", "compress", "-o", "out"]).is_err());
    }
}
