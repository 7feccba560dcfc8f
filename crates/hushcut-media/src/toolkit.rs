//! The media toolkit seam consumed by the worker.
//!
//! The job pipeline drives detection, planning, graph build, and
//! transcoding through this trait so lifecycle tests can run against a
//! scripted implementation without touching external tools.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use hushcut_models::Interval;

use crate::command::FfmpegRunner;
use crate::error::{MediaError, MediaResult};
use crate::speech::{SpeechModel, DEFAULT_MERGE_GAP_SECS};
use crate::transcode::TranscodeMode;

/// External media operations used by the job pipeline.
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Probe the total duration of a media file in seconds.
    async fn probe_duration(&self, path: &Path) -> MediaResult<f64>;

    /// Detect silence intervals (basic tier).
    async fn detect_silence(
        &self,
        path: &Path,
        threshold_db: f64,
        min_silence_secs: f64,
        duration: f64,
    ) -> MediaResult<Vec<Interval>>;

    /// Segment speech intervals (premium tier).
    async fn segment_speech(&self, path: &Path, work_dir: &Path) -> MediaResult<Vec<Interval>>;

    /// Produce the output file.
    async fn transcode(
        &self,
        input: &Path,
        mode: &TranscodeMode,
        output: &Path,
    ) -> MediaResult<()>;
}

/// Production toolkit backed by FFmpeg, ffprobe, and Whisper.
pub struct FfmpegToolkit {
    runner: FfmpegRunner,
    speech_model: Option<Arc<SpeechModel>>,
    merge_gap_secs: f64,
}

impl FfmpegToolkit {
    /// Create a toolkit without a speech model (basic tier only).
    pub fn new(timeout_secs: Option<u64>) -> Self {
        Self {
            runner: FfmpegRunner::new().with_timeout(timeout_secs),
            speech_model: None,
            merge_gap_secs: DEFAULT_MERGE_GAP_SECS,
        }
    }

    /// Attach the shared speech model handle (enables premium tier).
    pub fn with_speech_model(mut self, model: Arc<SpeechModel>) -> Self {
        self.speech_model = Some(model);
        self
    }

    /// Override the utterance merge gap.
    pub fn with_merge_gap_secs(mut self, secs: f64) -> Self {
        self.merge_gap_secs = secs;
        self
    }
}

#[async_trait]
impl MediaToolkit for FfmpegToolkit {
    async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        crate::probe::get_duration(path).await
    }

    async fn detect_silence(
        &self,
        path: &Path,
        threshold_db: f64,
        min_silence_secs: f64,
        duration: f64,
    ) -> MediaResult<Vec<Interval>> {
        crate::silence::detect_silence(path, threshold_db, min_silence_secs, duration, &self.runner)
            .await
    }

    async fn segment_speech(&self, path: &Path, work_dir: &Path) -> MediaResult<Vec<Interval>> {
        let model = self
            .speech_model
            .clone()
            .ok_or_else(|| MediaError::speech_model("No speech model loaded"))?;
        crate::speech::segment_speech(path, work_dir, model, self.merge_gap_secs, &self.runner)
            .await
    }

    async fn transcode(
        &self,
        input: &Path,
        mode: &TranscodeMode,
        output: &Path,
    ) -> MediaResult<()> {
        crate::transcode::transcode(input, mode, output, &self.runner).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_segment_speech_without_model_fails() {
        let toolkit = FfmpegToolkit::new(None);
        let err = toolkit
            .segment_speech(Path::new("in.mp4"), Path::new("/tmp"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::SpeechModel(_)));
    }
}
