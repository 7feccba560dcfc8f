//! The tier-dispatched silence-removal pipeline.
//!
//! One job, one pass: probe (if needed), check the tier cap, run the
//! tier's detector, plan the cut list, compile the filter graph, and
//! transcode. The first failing stage fails the job with that stage's
//! message verbatim; there are no retries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, Instrument};

use hushcut_media::{plan_from_silence, plan_from_speech, FilterGraph, MediaToolkit, TranscodeMode};
use hushcut_models::{JobId, Tier};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::store::JobStore;

/// Detection strategy selected by the billing tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStrategy {
    /// Amplitude silence detection via FFmpeg.
    Amplitude,
    /// Speech segmentation via the Whisper model.
    Speech,
}

impl DetectionStrategy {
    pub fn for_tier(tier: Tier) -> Self {
        if tier.uses_speech_model() {
            DetectionStrategy::Speech
        } else {
            DetectionStrategy::Amplitude
        }
    }
}

/// A single unit of work handed to the runner.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub job_id: JobId,
    pub input_path: PathBuf,
    pub tier: Tier,
    /// Scratch directory for this job; output lands here.
    pub work_dir: PathBuf,
    /// Input duration in seconds, if the submission layer already
    /// probed it. Absent triggers a probe.
    pub duration_hint: Option<f64>,
}

/// Runs jobs end to end against a media toolkit and a job store.
pub struct JobRunner {
    toolkit: Arc<dyn MediaToolkit>,
    store: Arc<dyn JobStore>,
    config: WorkerConfig,
}

impl JobRunner {
    pub fn new(
        toolkit: Arc<dyn MediaToolkit>,
        store: Arc<dyn JobStore>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            toolkit,
            store,
            config,
        }
    }

    /// Run one job to a terminal state.
    ///
    /// The store always ends up with the job in COMPLETED or FAILED;
    /// the returned result carries the output path or the stage error.
    pub async fn run(&self, request: &JobRequest) -> WorkerResult<PathBuf> {
        let logger = JobLogger::new(&request.job_id, "silence_removal");
        let span = logger.span();

        async {
            logger.started(&format!("input {}", request.input_path.display()));

            self.store.mark_processing(&request.job_id).await?;

            match self.run_stages(request, &logger).await {
                Ok(output) => {
                    self.store.mark_completed(&request.job_id, &output).await?;
                    logger.completed(&format!("output {}", output.display()));
                    Ok(output)
                }
                Err(err) => {
                    let message = err.stage_message();
                    logger.failed(&message);
                    self.store
                        .mark_failed(&request.job_id, err.kind(), &message)
                        .await?;
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_stages(&self, request: &JobRequest, logger: &JobLogger) -> WorkerResult<PathBuf> {
        let input = request.input_path.as_path();

        let duration = match request.duration_hint {
            Some(d) => d,
            None => self
                .toolkit
                .probe_duration(input)
                .await
                .map_err(|e| WorkerError::Probe(e.stage_message()))?,
        };

        // The cap is enforced before any detector work starts
        if let Some(cap) = request.tier.max_duration_secs() {
            if duration > cap {
                return Err(WorkerError::tier_violation(format!(
                    "{} tier accepts inputs up to {:.0}s, got {:.1}s",
                    request.tier, cap, duration
                )));
            }
        }

        let strategy = DetectionStrategy::for_tier(request.tier);
        let plan = match strategy {
            DetectionStrategy::Amplitude => {
                logger.progress("detecting silence");
                let silence = self
                    .toolkit
                    .detect_silence(
                        input,
                        self.config.silence_threshold_db,
                        self.config.min_silence_secs,
                        duration,
                    )
                    .await
                    .map_err(|e| WorkerError::detection(e.stage_message()))?;
                plan_from_silence(silence, duration)
            }
            DetectionStrategy::Speech => {
                logger.progress("segmenting speech");
                let speech = self
                    .toolkit
                    .segment_speech(input, &request.work_dir)
                    .await
                    .map_err(|e| WorkerError::detection(e.stage_message()))?;
                plan_from_speech(speech, duration)
            }
        };
        plan.validate().map_err(WorkerError::Planning)?;

        info!(
            job_id = %request.job_id,
            strategy = ?strategy,
            intervals = plan.intervals.len(),
            kept_secs = plan.kept_duration(),
            copy_through = plan.copy_through,
            "Segment plan ready"
        );

        let mode = if plan.copy_through {
            logger.warning("no speech detected, output will be a direct copy of the input");
            TranscodeMode::CopyThrough
        } else {
            TranscodeMode::Filter(FilterGraph::build(&plan.intervals))
        };

        let output = output_path(&request.work_dir, input)?;
        logger.progress("transcoding");
        self.toolkit
            .transcode(input, &mode, &output)
            .await
            .map_err(|e| WorkerError::transcode(e.stage_message()))?;

        Ok(output)
    }
}

/// Output path inside the job's work directory: `processed_<filename>`.
fn output_path(work_dir: &Path, input: &Path) -> WorkerResult<PathBuf> {
    let name = input
        .file_name()
        .ok_or_else(|| WorkerError::config(format!("Input has no file name: {}", input.display())))?;
    let mut out_name = std::ffi::OsString::from("processed_");
    out_name.push(name);
    Ok(work_dir.join(out_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hushcut_media::{MediaError, MediaResult};
    use hushcut_models::{Interval, JobStatus, ProcessingJob};
    use tokio::sync::Mutex;

    use crate::store::MemoryJobStore;

    /// Scripted toolkit recording which operations the pipeline invoked.
    struct ScriptedToolkit {
        duration: f64,
        silence: Result<Vec<Interval>, String>,
        speech: Result<Vec<Interval>, String>,
        transcode_err: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedToolkit {
        fn new(duration: f64) -> Self {
            Self {
                duration,
                silence: Ok(vec![]),
                speech: Ok(vec![]),
                transcode_err: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_silence(mut self, silence: Vec<Interval>) -> Self {
            self.silence = Ok(silence);
            self
        }

        fn with_speech(mut self, speech: Vec<Interval>) -> Self {
            self.speech = Ok(speech);
            self
        }

        fn with_silence_error(mut self, msg: &str) -> Self {
            self.silence = Err(msg.to_string());
            self
        }

        fn with_transcode_error(mut self, msg: &str) -> Self {
            self.transcode_err = Some(msg.to_string());
            self
        }

        async fn calls(&self) -> Vec<String> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl MediaToolkit for ScriptedToolkit {
        async fn probe_duration(&self, _path: &Path) -> MediaResult<f64> {
            self.calls.lock().await.push("probe".to_string());
            Ok(self.duration)
        }

        async fn detect_silence(
            &self,
            _path: &Path,
            _threshold_db: f64,
            _min_silence_secs: f64,
            _duration: f64,
        ) -> MediaResult<Vec<Interval>> {
            self.calls.lock().await.push("detect_silence".to_string());
            self.silence.clone().map_err(MediaError::detection)
        }

        async fn segment_speech(
            &self,
            _path: &Path,
            _work_dir: &Path,
        ) -> MediaResult<Vec<Interval>> {
            self.calls.lock().await.push("segment_speech".to_string());
            self.speech.clone().map_err(MediaError::speech_model)
        }

        async fn transcode(
            &self,
            _input: &Path,
            mode: &TranscodeMode,
            _output: &Path,
        ) -> MediaResult<()> {
            let label = match mode {
                TranscodeMode::Filter(_) => "transcode_filter",
                TranscodeMode::CopyThrough => "transcode_copy",
            };
            self.calls.lock().await.push(label.to_string());
            match &self.transcode_err {
                Some(msg) => Err(MediaError::transcode(msg.clone())),
                None => Ok(()),
            }
        }
    }

    async fn seeded(store: &MemoryJobStore, tier: Tier) -> JobRequest {
        let job = ProcessingJob::new("/uploads/clip.mp4", tier);
        let id = job.id.clone();
        store.insert(job).await;
        JobRequest {
            job_id: id,
            input_path: PathBuf::from("/uploads/clip.mp4"),
            tier,
            work_dir: PathBuf::from("/work/job"),
            duration_hint: None,
        }
    }

    fn runner(toolkit: Arc<ScriptedToolkit>, store: Arc<MemoryJobStore>) -> JobRunner {
        JobRunner::new(toolkit, store, WorkerConfig::default())
    }

    #[tokio::test]
    async fn test_basic_job_completes() {
        let toolkit = Arc::new(
            ScriptedToolkit::new(15.0)
                .with_silence(vec![Interval::new(2.0, 4.0), Interval::new(10.0, 11.5)]),
        );
        let store = MemoryJobStore::new();
        let request = seeded(&store, Tier::Basic).await;

        let output = runner(toolkit.clone(), store.clone())
            .run(&request)
            .await
            .unwrap();

        assert_eq!(output, PathBuf::from("/work/job/processed_clip.mp4"));
        let job = store.get(&request.job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.output_path, Some(output));
        assert_eq!(
            toolkit.calls().await,
            vec!["probe", "detect_silence", "transcode_filter"]
        );
    }

    #[tokio::test]
    async fn test_basic_tier_cap_rejects_before_detection() {
        let toolkit = Arc::new(ScriptedToolkit::new(90.0));
        let store = MemoryJobStore::new();
        let request = seeded(&store, Tier::Basic).await;

        let err = runner(toolkit.clone(), store.clone())
            .run(&request)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "tier_violation");
        let job = store.get(&request.job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error_kind.as_deref(), Some("tier_violation"));
        // No detector or encoder work after the cap check fails
        assert_eq!(toolkit.calls().await, vec!["probe"]);
    }

    #[tokio::test]
    async fn test_duration_hint_skips_probe() {
        let toolkit = Arc::new(ScriptedToolkit::new(999.0));
        let store = MemoryJobStore::new();
        let mut request = seeded(&store, Tier::Basic).await;
        request.duration_hint = Some(30.0);

        runner(toolkit.clone(), store.clone())
            .run(&request)
            .await
            .unwrap();

        assert_eq!(
            toolkit.calls().await,
            vec!["detect_silence", "transcode_filter"]
        );
    }

    #[tokio::test]
    async fn test_premium_has_no_cap() {
        let toolkit = Arc::new(
            ScriptedToolkit::new(3600.0).with_speech(vec![Interval::new(5.0, 10.0)]),
        );
        let store = MemoryJobStore::new();
        let request = seeded(&store, Tier::Premium).await;

        runner(toolkit.clone(), store.clone())
            .run(&request)
            .await
            .unwrap();

        let job = store.get(&request.job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(
            toolkit.calls().await,
            vec!["probe", "segment_speech", "transcode_filter"]
        );
    }

    #[tokio::test]
    async fn test_premium_no_speech_copies_through() {
        let toolkit = Arc::new(ScriptedToolkit::new(60.0).with_speech(vec![]));
        let store = MemoryJobStore::new();
        let request = seeded(&store, Tier::Premium).await;

        runner(toolkit.clone(), store.clone())
            .run(&request)
            .await
            .unwrap();

        assert_eq!(
            toolkit.calls().await,
            vec!["probe", "segment_speech", "transcode_copy"]
        );
    }

    #[tokio::test]
    async fn test_detection_failure_message_is_verbatim() {
        let toolkit = Arc::new(
            ScriptedToolkit::new(30.0).with_silence_error("ffmpeg exited with code 1"),
        );
        let store = MemoryJobStore::new();
        let request = seeded(&store, Tier::Basic).await;

        let err = runner(toolkit.clone(), store.clone())
            .run(&request)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "detection");
        let job = store.get(&request.job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        // The record carries the originating message untouched; the
        // error kind already names the stage
        assert_eq!(
            job.error_message.as_deref(),
            Some("ffmpeg exited with code 1")
        );
        // Failure stops the pipeline; no encode is attempted
        assert_eq!(toolkit.calls().await, vec!["probe", "detect_silence"]);
    }

    #[tokio::test]
    async fn test_transcode_failure_fails_job() {
        let toolkit = Arc::new(
            ScriptedToolkit::new(30.0)
                .with_silence(vec![Interval::new(5.0, 10.0)])
                .with_transcode_error("Encoder produced no output file"),
        );
        let store = MemoryJobStore::new();
        let request = seeded(&store, Tier::Basic).await;

        let err = runner(toolkit.clone(), store.clone())
            .run(&request)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "transcode");
        let job = store.get(&request.job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(
            job.error_message.as_deref(),
            Some("Encoder produced no output file")
        );
    }

    #[tokio::test]
    async fn test_fully_silent_basic_still_encodes_sliver() {
        let toolkit =
            Arc::new(ScriptedToolkit::new(30.0).with_silence(vec![Interval::new(0.0, 30.0)]));
        let store = MemoryJobStore::new();
        let request = seeded(&store, Tier::Basic).await;

        runner(toolkit.clone(), store.clone())
            .run(&request)
            .await
            .unwrap();

        let job = store.get(&request.job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(
            toolkit.calls().await,
            vec!["probe", "detect_silence", "transcode_filter"]
        );
    }

    #[test]
    fn test_strategy_for_tier() {
        assert_eq!(
            DetectionStrategy::for_tier(Tier::Basic),
            DetectionStrategy::Amplitude
        );
        assert_eq!(
            DetectionStrategy::for_tier(Tier::Premium),
            DetectionStrategy::Speech
        );
    }

    #[test]
    fn test_output_path_naming() {
        let out = output_path(Path::new("/work/abc"), Path::new("/uploads/talk.mp4")).unwrap();
        assert_eq!(out, PathBuf::from("/work/abc/processed_talk.mp4"));
    }
}
