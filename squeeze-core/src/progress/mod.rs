//! Encoder progress parsing.
//!
//! The encoder reports progress on its diagnostic stream as lines such as
//! `frame=  240 fps= 48 q=28.0 size=512kB time=00:00:10.00 bitrate=...`.
//! This module frames that stream into lines and extracts the elapsed media
//! time from each one. Lines without a usable timestamp are skipped, never
//! reported as errors.

pub mod eta;

use regex::Regex;
use std::io::{self, BufRead};
use std::sync::LazyLock;

pub use eta::{estimate_remaining, eta_whole_seconds};

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"time=(\d{1,2}):(\d{1,2}):(\d{1,2}\.\d{1,2})").unwrap());

/// One elapsed-time observation extracted from a diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    /// Media time the encoder has reached, in seconds
    pub elapsed_media_seconds: f64,
}

/// Extracts a progress sample from one line of encoder output.
///
/// Matches `time=H:MM:SS.ff` anywhere in the line (each field 1-2 digits) and
/// returns `hours*3600 + minutes*60 + seconds`. Returns `None` when the line
/// has no timestamp or its fields do not parse.
///
/// ```rust
/// use squeeze_core::progress::parse_progress_line;
///
/// let sample = parse_progress_line("frame=10 time=00:01:30.50 bitrate=N/A").unwrap();
/// assert_eq!(sample.elapsed_media_seconds, 90.5);
/// assert!(parse_progress_line("Press [q] to stop").is_none());
/// ```
#[must_use]
pub fn parse_progress_line(line: &str) -> Option<ProgressSample> {
    let caps = TIME_RE.captures(line)?;
    let hours = caps[1].parse::<u32>().ok()?;
    let minutes = caps[2].parse::<u32>().ok()?;
    let seconds = caps[3].parse::<f64>().ok()?;

    Some(ProgressSample {
        elapsed_media_seconds: f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + seconds,
    })
}

/// Percent complete for a sample against the probed total, clamped to 0-100.
///
/// An unknown (zero or negative) total yields 0.
#[must_use]
pub fn percent_complete(sample: &ProgressSample, total_duration_seconds: f64) -> f64 {
    if total_duration_seconds <= 0.0 || !total_duration_seconds.is_finite() {
        return 0.0;
    }
    (sample.elapsed_media_seconds / total_duration_seconds * 100.0).clamp(0.0, 100.0)
}

/// Iterator over the logical lines of an encoder's diagnostic stream.
///
/// `\r`, `\n` and `\r\n` all terminate a line, since the encoder rewrites its
/// status line with carriage returns. Empty lines are skipped and invalid
/// UTF-8 is replaced. A read error ends the iteration.
pub struct StderrLines<R> {
    reader: R,
    buf: Vec<u8>,
    finished: bool,
}

impl<R: BufRead> StderrLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for StderrLines<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while !self.finished {
            self.buf.clear();
            match read_until_terminator(&mut self.reader, &mut self.buf) {
                Ok(0) => self.finished = true,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&self.buf);
                    let line = line.trim_end_matches(['\r', '\n']);
                    if !line.trim().is_empty() {
                        return Some(line.to_string());
                    }
                }
                Err(e) => {
                    log::debug!("Encoder diagnostic stream closed with error: {e}");
                    self.finished = true;
                }
            }
        }
        None
    }
}

/// Reads bytes up to and including the next `\r` or `\n`.
fn read_until_terminator<R: BufRead>(reader: &mut R, out: &mut Vec<u8>) -> io::Result<usize> {
    let mut read = 0;
    loop {
        let (found, used) = {
            let available = match reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok(read);
            }
            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(i) => {
                    out.extend_from_slice(&available[..=i]);
                    (true, i + 1)
                }
                None => {
                    out.extend_from_slice(available);
                    (false, available.len())
                }
            }
        };
        reader.consume(used);
        read += used;
        if found {
            return Ok(read);
        }
    }
}
