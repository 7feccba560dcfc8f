//! Job persistence seam.
//!
//! The pipeline pushes lifecycle updates through `JobStore` so the
//! processing code never depends on a concrete backend. The in-memory
//! store backs the single-job binary and the lifecycle tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use hushcut_models::{JobId, ProcessingJob};

use crate::error::{WorkerError, WorkerResult};

/// Lifecycle updates emitted by the pipeline.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Mark the job as picked up for processing.
    async fn mark_processing(&self, job_id: &JobId) -> WorkerResult<()>;

    /// Mark the job completed with its output file.
    async fn mark_completed(&self, job_id: &JobId, output: &Path) -> WorkerResult<()>;

    /// Mark the job failed with a machine-readable kind and the
    /// verbatim stage message.
    async fn mark_failed(&self, job_id: &JobId, kind: &str, message: &str) -> WorkerResult<()>;
}

/// In-memory job store backed by a map.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<JobId, ProcessingJob>>,
}

impl MemoryJobStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a job before running it.
    pub async fn insert(&self, job: ProcessingJob) {
        self.jobs.lock().await.insert(job.id.clone(), job);
    }

    /// Fetch a snapshot of a job record.
    pub async fn get(&self, job_id: &JobId) -> Option<ProcessingJob> {
        self.jobs.lock().await.get(job_id).cloned()
    }

    async fn with_job<F>(&self, job_id: &JobId, f: F) -> WorkerResult<()>
    where
        F: FnOnce(&mut ProcessingJob),
    {
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| WorkerError::store(format!("Unknown job: {}", job_id)))?;
        f(job);
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn mark_processing(&self, job_id: &JobId) -> WorkerResult<()> {
        self.with_job(job_id, |job| job.start()).await
    }

    async fn mark_completed(&self, job_id: &JobId, output: &Path) -> WorkerResult<()> {
        self.with_job(job_id, |job| job.complete(output)).await
    }

    async fn mark_failed(&self, job_id: &JobId, kind: &str, message: &str) -> WorkerResult<()> {
        self.with_job(job_id, |job| job.fail(kind, message)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hushcut_models::{JobStatus, Tier};

    #[tokio::test]
    async fn test_memory_store_lifecycle() {
        let store = MemoryJobStore::new();
        let job = ProcessingJob::new("/uploads/clip.mp4", Tier::Basic);
        let id = job.id.clone();
        store.insert(job).await;

        store.mark_processing(&id).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().status, JobStatus::Processing);

        store
            .mark_completed(&id, Path::new("/work/processed_clip.mp4"))
            .await
            .unwrap();
        let job = store.get(&id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.output_path.is_some());
    }

    #[tokio::test]
    async fn test_memory_store_failure_records_reason() {
        let store = MemoryJobStore::new();
        let job = ProcessingJob::new("/uploads/clip.mp4", Tier::Premium);
        let id = job.id.clone();
        store.insert(job).await;

        store.mark_processing(&id).await.unwrap();
        store
            .mark_failed(&id, "detection", "ffmpeg exited with code 1")
            .await
            .unwrap();
        let job = store.get(&id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error_kind.as_deref(), Some("detection"));
        assert_eq!(job.error_message.as_deref(), Some("ffmpeg exited with code 1"));
    }

    #[tokio::test]
    async fn test_memory_store_unknown_job() {
        let store = MemoryJobStore::new();
        let err = store.mark_processing(&JobId::new()).await.unwrap_err();
        assert_eq!(err.kind(), "store");
    }
}
