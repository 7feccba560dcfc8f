//! Final encode: apply the compiled filter graph, or stream copy.
//!
//! Fixed encoding parameters (libx264 + aac) with overwrite allowed.
//! A failed or empty encode never leaves a partial output file behind.

use std::path::Path;

use tracing::{debug, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filtergraph::FilterGraph;

/// How the output should be produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscodeMode {
    /// Trim and concatenate through the compiled filter graph.
    Filter(FilterGraph),
    /// Direct stream copy (no-speech copy-through).
    CopyThrough,
}

/// Transcode `input_path` to `output_path` according to `mode`.
///
/// Blocks until the encoder exits. Non-zero exit, timeout, or an
/// empty/missing output file is a transcode error; any partial output
/// is deleted before the error surfaces.
pub async fn transcode(
    input_path: &Path,
    mode: &TranscodeMode,
    output_path: &Path,
    runner: &FfmpegRunner,
) -> MediaResult<()> {
    let cmd = match mode {
        TranscodeMode::Filter(graph) => {
            debug!(
                input = %input_path.display(),
                output = %output_path.display(),
                nodes = graph.nodes.len(),
                "Transcoding with filter graph"
            );
            FfmpegCommand::new(input_path, output_path)
                .filter_complex(graph.render())
                .map(graph.output_map())
                .video_codec("libx264")
                .audio_codec("aac")
        }
        TranscodeMode::CopyThrough => {
            debug!(
                input = %input_path.display(),
                output = %output_path.display(),
                "Transcoding with stream copy"
            );
            FfmpegCommand::new(input_path, output_path).stream_copy()
        }
    };

    if let Err(e) = runner.run(&cmd).await {
        remove_partial_output(output_path).await;
        return Err(match e {
            MediaError::Timeout(secs) => {
                MediaError::transcode(format!("Encoder timed out after {} seconds", secs))
            }
            other => MediaError::transcode(other.to_string()),
        });
    }

    // An encoder can exit zero and still write nothing useful
    match tokio::fs::metadata(output_path).await {
        Ok(meta) if meta.len() > 0 => Ok(()),
        Ok(_) => {
            remove_partial_output(output_path).await;
            Err(MediaError::transcode("Encoder produced an empty output file"))
        }
        Err(_) => Err(MediaError::transcode("Encoder produced no output file")),
    }
}

/// Delete a partially-written output so a failed job leaves no artifact.
async fn remove_partial_output(output_path: &Path) {
    match tokio::fs::remove_file(output_path).await {
        Ok(()) => debug!(path = %output_path.display(), "Removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            path = %output_path.display(),
            error = %e,
            "Failed to remove partial output"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hushcut_models::Interval;

    #[test]
    fn test_filter_mode_command_shape() {
        let graph = FilterGraph::build(&[Interval::new(0.0, 2.0)]);
        let cmd = FfmpegCommand::new("in.mp4", "out.mp4")
            .filter_complex(graph.render())
            .map(graph.output_map())
            .video_codec("libx264")
            .audio_codec("aac");

        let args = cmd.build_args();
        let map_pos = args.iter().position(|a| a == "-map").unwrap();
        assert_eq!(args[map_pos + 1], "[out]");
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"aac".to_string()));
    }

    #[tokio::test]
    async fn test_remove_partial_output_missing_file_is_quiet() {
        // Must not panic or error when there is nothing to clean up
        remove_partial_output(Path::new("/nonexistent/partial.mp4")).await;
    }
}
