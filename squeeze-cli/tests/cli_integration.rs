use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn squeeze_cmd() -> Command {
    Command::cargo_bin("squeeze").expect("Failed to find squeeze binary")
}

#[test]
fn test_help_lists_compress() {
    squeeze_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("compress"));
}

#[test]
fn test_compress_requires_input_and_output() {
    squeeze_cmd()
        .arg("compress")
        .assert()
        .failure()
        .stderr(contains("--input"));
}

#[test]
fn test_compress_non_existent_input() -> Result<(), Box<dyn Error>> {
    let output_dir = tempdir()?;

    squeeze_cmd()
        .arg("compress")
        .arg("--input")
        .arg("surely/this/does/not/exist/input.mp4")
        .arg("--output")
        .arg(output_dir.path())
        .assert()
        .failure()
        .stderr(contains("Input path does not exist"));

    Ok(())
}

#[test]
fn test_compress_folder_without_videos() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    std::fs::write(input_dir.path().join("notes.txt"), "not a video")?;
    std::fs::write(input_dir.path().join("cover.jpg"), "not a video")?;

    squeeze_cmd()
        .arg("compress")
        .arg("-i")
        .arg(input_dir.path())
        .arg("-o")
        .arg(output_dir.path())
        .assert()
        .failure()
        .stderr(contains("No processable video files found"));

    Ok(())
}

#[test]
fn test_compress_unsupported_file() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    let input_file = input_dir.path().join("clip.webm");
    std::fs::write(&input_file, "dummy content")?;

    squeeze_cmd()
        .arg("compress")
        .arg("-i")
        .arg(&input_file)
        .arg("-o")
        .arg(output_dir.path())
        .assert()
        .failure()
        .stderr(contains("is not a supported video file"));

    Ok(())
}

#[test]
fn test_compress_writes_run_log() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    let log_dir = tempdir()?;
    std::fs::write(input_dir.path().join("readme.md"), "nothing here")?;

    squeeze_cmd()
        .arg("compress")
        .arg("-i")
        .arg(input_dir.path())
        .arg("-o")
        .arg(output_dir.path())
        .arg("--log-dir")
        .arg(log_dir.path())
        .assert()
        .failure();

    let logs: Vec<_> = std::fs::read_dir(log_dir.path())?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("squeeze_run_"))
        .collect();
    assert_eq!(logs.len(), 1);

    Ok(())
}
