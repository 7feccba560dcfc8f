//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Silence detection failed: {0}")]
    Detection(String),

    #[error("Transcode failed: {0}")]
    Transcode(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("Speech model error: {0}")]
    SpeechModel(String),
}

impl MediaError {
    /// Create a detection failure error.
    pub fn detection(message: impl Into<String>) -> Self {
        Self::Detection(message.into())
    }

    /// Create a transcode failure error.
    pub fn transcode(message: impl Into<String>) -> Self {
        Self::Transcode(message.into())
    }

    /// Create a speech model error.
    pub fn speech_model(message: impl Into<String>) -> Self {
        Self::SpeechModel(message.into())
    }

    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// The message as the failing operation produced it, without the
    /// variant's Display prefix. Stored on the job record, where the
    /// error kind already identifies the stage.
    pub fn stage_message(&self) -> String {
        match self {
            MediaError::Detection(m)
            | MediaError::Transcode(m)
            | MediaError::InvalidVideo(m)
            | MediaError::SpeechModel(m) => m.clone(),
            MediaError::FfmpegFailed { message, .. }
            | MediaError::FfprobeFailed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_message_strips_display_prefix() {
        let err = MediaError::detection("ffmpeg exited with code 1");
        assert_eq!(
            err.to_string(),
            "Silence detection failed: ffmpeg exited with code 1"
        );
        assert_eq!(err.stage_message(), "ffmpeg exited with code 1");
    }

    #[test]
    fn test_stage_message_passthrough_variants() {
        assert_eq!(
            MediaError::transcode("Encoder produced no output file").stage_message(),
            "Encoder produced no output file"
        );
        assert_eq!(
            MediaError::ffmpeg_failed("boom", None, Some(1)).stage_message(),
            "boom"
        );
        // Variants without an inner message fall back to Display
        assert_eq!(
            MediaError::Timeout(30).stage_message(),
            "Operation timed out after 30 seconds"
        );
    }
}
