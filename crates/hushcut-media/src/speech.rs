//! Speech segmentation via the Whisper transcription model.
//!
//! The premium detection path: extract the audio track to 16kHz mono
//! f32 PCM, run one transcription pass, and keep only the per-utterance
//! timestamps (the transcript text is discarded). Adjacent utterances
//! separated by less than a small gap are merged so the cut list does
//! not fragment into thousands of micro-segments.
//!
//! The model handle is loaded once at worker startup and shared across
//! jobs; there is no lazily-initialized global state.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use hushcut_models::{merge_intervals, Interval};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Sample rate the model expects.
const SAMPLE_RATE: usize = 16_000;

/// Default gap below which adjacent utterances are merged, in seconds.
pub const DEFAULT_MERGE_GAP_SECS: f64 = 0.3;

/// Loaded Whisper model, shared across jobs within a worker.
pub struct SpeechModel {
    ctx: WhisperContext,
}

impl SpeechModel {
    /// Load the model from a ggml model file.
    pub fn load(model_path: &Path) -> MediaResult<Self> {
        let path_str = model_path
            .to_str()
            .ok_or_else(|| MediaError::speech_model("Model path is not valid UTF-8"))?;

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| {
                MediaError::speech_model(format!(
                    "Failed to load model from {}: {}",
                    model_path.display(),
                    e
                ))
            })?;

        debug!(model = %model_path.display(), "Loaded speech model");

        Ok(Self { ctx })
    }

    /// Run one transcription pass and return raw utterance intervals.
    ///
    /// Timestamps come back from the model in centiseconds.
    fn transcribe(&self, samples: &[f32]) -> MediaResult<Vec<Interval>> {
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| MediaError::speech_model(format!("Failed to create state: {}", e)))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_no_context(true);

        state
            .full(params, samples)
            .map_err(|e| MediaError::speech_model(format!("Inference failed: {}", e)))?;

        let count = state
            .full_n_segments()
            .map_err(|e| MediaError::speech_model(format!("Segment count failed: {}", e)))?;

        let mut intervals = Vec::with_capacity(count as usize);
        for i in 0..count {
            let t0 = state
                .full_get_segment_t0(i)
                .map_err(|e| MediaError::speech_model(format!("Segment start failed: {}", e)))?;
            let t1 = state
                .full_get_segment_t1(i)
                .map_err(|e| MediaError::speech_model(format!("Segment end failed: {}", e)))?;

            let start = t0 as f64 / 100.0;
            let end = t1 as f64 / 100.0;
            if end > start {
                intervals.push(Interval::new(start, end));
            }
        }

        Ok(intervals)
    }
}

/// Segment speech in a media file.
///
/// # Arguments
/// - `input_path`: Path to video or audio file
/// - `work_dir`: Per-job scratch directory for the extracted audio
/// - `model`: Shared model handle owned by the worker
/// - `merge_gap_secs`: Gap tolerance for merging adjacent utterances
/// - `runner`: Runner carrying the external-tool timeout
pub async fn segment_speech(
    input_path: &Path,
    work_dir: &Path,
    model: Arc<SpeechModel>,
    merge_gap_secs: f64,
    runner: &FfmpegRunner,
) -> MediaResult<Vec<Interval>> {
    debug!(
        path = %input_path.display(),
        merge_gap_secs = merge_gap_secs,
        "Starting speech segmentation"
    );

    // Temp file lives in the per-job work dir and is removed on drop
    let temp_audio = tempfile::Builder::new()
        .prefix("audio_")
        .suffix(".pcm")
        .tempfile_in(work_dir)?;

    extract_audio(input_path, temp_audio.path(), runner).await?;
    let samples = load_audio_samples(temp_audio.path()).await?;

    if samples.is_empty() {
        return Err(MediaError::detection("No audio data found in file"));
    }

    let segments = tokio::task::spawn_blocking(move || model.transcribe(&samples))
        .await
        .map_err(|e| MediaError::detection(format!("Inference task panicked: {}", e)))?
        .map_err(|e| MediaError::detection(e.to_string()))?;

    let merged = merge_intervals(segments, merge_gap_secs);

    debug!(
        utterances = merged.len(),
        "Speech segmentation complete"
    );

    Ok(merged)
}

/// Extract the audio track to 16kHz mono raw f32le PCM.
async fn extract_audio(input: &Path, output: &Path, runner: &FfmpegRunner) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(input, output)
        .no_video()
        .output_args(["-ar", &SAMPLE_RATE.to_string(), "-ac", "1", "-f", "f32le"]);

    runner.run(&cmd).await.map_err(|e| match e {
        MediaError::Timeout(secs) => {
            MediaError::detection(format!("Audio extraction timed out after {} seconds", secs))
        }
        other => MediaError::detection(format!("Audio extraction failed: {}", other)),
    })?;

    let metadata = tokio::fs::metadata(output).await?;
    if metadata.len() == 0 {
        return Err(MediaError::detection("No audio data found in file"));
    }

    Ok(())
}

/// Load raw f32le audio samples from a file.
async fn load_audio_samples(path: &Path) -> MediaResult<Vec<f32>> {
    let bytes = tokio::fs::read(path).await?;

    let samples: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Ok(samples)
}
