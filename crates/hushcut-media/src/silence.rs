//! Amplitude-threshold silence detection via FFmpeg silencedetect.
//!
//! FFmpeg emits a sequential trace on stderr:
//!
//! ```text
//! [silencedetect @ 0x...] silence_start: 2.0
//! [silencedetect @ 0x...] silence_end: 4.0 | silence_duration: 2.0
//! ```
//!
//! The trace is parsed with an explicit two-state machine:
//!
//! ```text
//!              silence_start: T
//!     ┌────────────────────────────────┐
//!     │                                ▼
//! ┌──────┐                        ┌─────────┐
//! │ Idle │◄───────────────────────│InSilence│
//! └──────┘      silence_end: T    └─────────┘
//! ```
//!
//! Each start marker pairs with the next end marker in trace order. A
//! trailing unmatched start means silence ran to end-of-file and is
//! closed at the total duration. Malformed lines are skipped fail-open;
//! only a process-level failure aborts detection.

use std::path::Path;

use tracing::{debug, warn};

use hushcut_models::Interval;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Default silencedetect noise threshold in dB.
pub const DEFAULT_THRESHOLD_DB: f64 = -50.0;

/// Default minimum silence duration in seconds.
pub const DEFAULT_MIN_SILENCE_SECS: f64 = 1.0;

/// Detect silence intervals in a media file.
///
/// # Arguments
/// - `input_path`: Path to video or audio file
/// - `threshold_db`: Noise floor in dB (e.g. -50.0)
/// - `min_silence_secs`: Minimum silence length to report
/// - `duration`: Total media duration, used to close a trailing interval
/// - `runner`: Runner carrying the external-tool timeout
pub async fn detect_silence(
    input_path: &Path,
    threshold_db: f64,
    min_silence_secs: f64,
    duration: f64,
    runner: &FfmpegRunner,
) -> MediaResult<Vec<Interval>> {
    debug!(
        path = %input_path.display(),
        threshold_db = threshold_db,
        min_silence_secs = min_silence_secs,
        "Running silencedetect"
    );

    let cmd = FfmpegCommand::null_output(input_path)
        .log_level("info")
        .audio_filter(format!(
            "silencedetect=n={}dB:d={}",
            threshold_db, min_silence_secs
        ));

    let output = runner
        .run_capture(&cmd)
        .await
        .map_err(|e| match e {
            MediaError::Timeout(secs) => {
                MediaError::detection(format!("silencedetect timed out after {} seconds", secs))
            }
            other => MediaError::detection(other.to_string()),
        })?;

    if !output.success {
        let last_line = output.stderr.lines().last().unwrap_or("Unknown error");
        return Err(MediaError::detection(format!(
            "silencedetect exited with code {:?}: {}",
            output.exit_code, last_line
        )));
    }

    let intervals = parse_silence_trace(&output.stderr, duration);

    debug!(
        silence_intervals = intervals.len(),
        "Silence detection complete"
    );

    Ok(intervals)
}

/// Parser state for the silencedetect trace.
enum ParseState {
    /// Waiting for the next silence_start marker.
    Idle,
    /// Saw a start marker at this time, waiting for its end marker.
    InSilence(f64),
}

/// Parse a silencedetect trace into silence intervals.
///
/// A trailing unmatched start marker closes at `duration`. Lines that do
/// not parse are skipped with a warning rather than failing the run.
pub fn parse_silence_trace(trace: &str, duration: f64) -> Vec<Interval> {
    let mut intervals = Vec::new();
    let mut state = ParseState::Idle;

    for line in trace.lines() {
        if let Some(value) = marker_value(line, "silence_start:") {
            match value {
                Some(start) => state = ParseState::InSilence(start),
                None => warn!(line = line, "Skipping malformed silence_start line"),
            }
        } else if let Some(value) = marker_value(line, "silence_end:") {
            match (&state, value) {
                (ParseState::InSilence(start), Some(end)) => {
                    if end > *start {
                        intervals.push(Interval::new(*start, end));
                    }
                    state = ParseState::Idle;
                }
                (ParseState::Idle, Some(_)) => {
                    warn!(line = line, "Skipping unpaired silence_end line");
                }
                (_, None) => warn!(line = line, "Skipping malformed silence_end line"),
            }
        }
    }

    // Silence running to end-of-file: close the interval at the total duration
    if let ParseState::InSilence(start) = state {
        if duration > start {
            intervals.push(Interval::new(start, duration));
        }
    }

    intervals
}

/// Extract the numeric value following a marker on a trace line.
///
/// Returns `None` when the marker is absent, `Some(None)` when the marker
/// is present but its value does not parse.
fn marker_value(line: &str, marker: &str) -> Option<Option<f64>> {
    let rest = line.split(marker).nth(1)?;
    Some(
        rest.split_whitespace()
            .next()
            .and_then(|token| token.parse::<f64>().ok()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paired_markers() {
        let trace = "\
[silencedetect @ 0x5635] silence_start: 2.0
[silencedetect @ 0x5635] silence_end: 4.0 | silence_duration: 2.0
[silencedetect @ 0x5635] silence_start: 10.0
[silencedetect @ 0x5635] silence_end: 11.5 | silence_duration: 1.5
";
        let intervals = parse_silence_trace(trace, 15.0);
        assert_eq!(
            intervals,
            vec![Interval::new(2.0, 4.0), Interval::new(10.0, 11.5)]
        );
    }

    #[test]
    fn test_trailing_start_closes_at_duration() {
        let trace = "[silencedetect @ 0x1] silence_start: 58.0\n";
        let intervals = parse_silence_trace(trace, 60.0);
        assert_eq!(intervals, vec![Interval::new(58.0, 60.0)]);
    }

    #[test]
    fn test_trailing_start_at_or_past_duration_dropped() {
        let trace = "[silencedetect @ 0x1] silence_start: 60.0\n";
        assert!(parse_silence_trace(trace, 60.0).is_empty());
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let trace = "\
[silencedetect @ 0x1] silence_start: garbage
[silencedetect @ 0x1] silence_start: 1.0
frame= 100 fps= 30 q=-0.0 size=N/A
[silencedetect @ 0x1] silence_end: 2.0 | silence_duration: 1.0
";
        let intervals = parse_silence_trace(trace, 10.0);
        assert_eq!(intervals, vec![Interval::new(1.0, 2.0)]);
    }

    #[test]
    fn test_unpaired_end_skipped() {
        let trace = "[silencedetect @ 0x1] silence_end: 3.0 | silence_duration: 1.0\n";
        assert!(parse_silence_trace(trace, 10.0).is_empty());
    }

    #[test]
    fn test_end_before_start_dropped() {
        let trace = "\
[silencedetect @ 0x1] silence_start: 5.0
[silencedetect @ 0x1] silence_end: 4.0 | silence_duration: -1.0
";
        assert!(parse_silence_trace(trace, 10.0).is_empty());
    }

    #[test]
    fn test_empty_trace() {
        assert!(parse_silence_trace("", 10.0).is_empty());
    }

    #[test]
    fn test_restart_after_pair() {
        // A start marker after a completed pair opens a fresh interval
        let trace = "\
[silencedetect @ 0x1] silence_start: 1.0
[silencedetect @ 0x1] silence_end: 2.0 | silence_duration: 1.0
[silencedetect @ 0x1] silence_start: 8.5
";
        let intervals = parse_silence_trace(trace, 9.0);
        assert_eq!(
            intervals,
            vec![Interval::new(1.0, 2.0), Interval::new(8.5, 9.0)]
        );
    }
}
