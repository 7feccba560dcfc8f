//! FFmpeg/Whisper wrapper for silence detection and removal.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeout handling
//! - Duration probing via ffprobe
//! - Amplitude silence detection (silencedetect trace parsing)
//! - Speech segmentation via a shared Whisper model handle
//! - Segment planning and deterministic filter graph compilation
//! - The final transcode step, including copy-through

pub mod command;
pub mod error;
pub mod filtergraph;
pub mod plan;
pub mod probe;
pub mod silence;
pub mod speech;
pub mod toolkit;
pub mod transcode;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use filtergraph::{FilterGraph, FilterNode};
pub use plan::{plan_from_silence, plan_from_speech, SegmentPlan};
pub use probe::{get_duration, probe_media, MediaInfo};
pub use silence::{detect_silence, parse_silence_trace, DEFAULT_MIN_SILENCE_SECS, DEFAULT_THRESHOLD_DB};
pub use speech::{segment_speech, SpeechModel, DEFAULT_MERGE_GAP_SECS};
pub use toolkit::{FfmpegToolkit, MediaToolkit};
pub use transcode::{transcode, TranscodeMode};
