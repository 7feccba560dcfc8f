//! Silence-removal worker binary.
//!
//! Runs a single job from the command line:
//! `hushcut-worker <input> [basic|premium]`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hushcut_media::{check_ffmpeg, check_ffprobe, FfmpegToolkit, SpeechModel};
use hushcut_models::{ProcessingJob, Tier};
use hushcut_worker::{JobRequest, JobRunner, MemoryJobStore, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("hushcut=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let mut args = std::env::args().skip(1);
    let input = match args.next() {
        Some(p) => PathBuf::from(p),
        None => bail!("Usage: hushcut-worker <input> [basic|premium]"),
    };
    let tier: Tier = args
        .next()
        .unwrap_or_else(|| "basic".to_string())
        .parse()
        .context("Invalid tier")?;

    check_ffmpeg()?;
    check_ffprobe()?;

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let mut toolkit = FfmpegToolkit::new(config.tool_timeout_secs)
        .with_merge_gap_secs(config.merge_gap_secs);
    if let Some(model_path) = &config.speech_model_path {
        let model = SpeechModel::load(std::path::Path::new(model_path))
            .context("Failed to load speech model")?;
        toolkit = toolkit.with_speech_model(Arc::new(model));
    } else if tier.uses_speech_model() {
        bail!("{} tier requires HUSHCUT_SPEECH_MODEL to be set", tier);
    }

    let store = MemoryJobStore::new();
    let job = ProcessingJob::new(&input, tier);
    let job_id = job.id.clone();
    store.insert(job).await;

    let work_dir = PathBuf::from(&config.work_dir).join(job_id.as_str());
    tokio::fs::create_dir_all(&work_dir)
        .await
        .context("Failed to create work directory")?;

    let runner = JobRunner::new(Arc::new(toolkit), store.clone(), config);
    let request = JobRequest {
        job_id: job_id.clone(),
        input_path: input,
        tier,
        work_dir,
        duration_hint: None,
    };

    let result = runner.run(&request).await;

    if let Some(job) = store.get(&job_id).await {
        println!("{}", serde_json::to_string_pretty(&job)?);
    }

    match result {
        Ok(output) => {
            info!("Output written to {}", output.display());
            Ok(())
        }
        Err(e) => bail!("Job failed: {}", e),
    }
}
