//! Structured logging for job lifecycle events.
//!
//! Every event carries the job id and operation name; the runner wraps
//! a job's stages in [`JobLogger::span`] so stage-level tracing from the
//! media crate inherits both fields.

use tracing::{error, info, warn, Span};

use hushcut_models::JobId;

/// Emits lifecycle events for one job.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    operation: &'static str,
}

impl JobLogger {
    pub fn new(job_id: &JobId, operation: &'static str) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation,
        }
    }

    /// Span covering the whole run of this job's stages.
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            operation = self.operation
        )
    }

    pub fn started(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = self.operation,
            "Job started: {}", message
        );
    }

    pub fn progress(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = self.operation,
            "Job progress: {}", message
        );
    }

    /// Degenerate-but-recoverable conditions, like a clip with no
    /// detected speech.
    pub fn warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            operation = self.operation,
            "Job warning: {}", message
        );
    }

    pub fn failed(&self, message: &str) {
        error!(
            job_id = %self.job_id,
            operation = self.operation,
            "Job failed: {}", message
        );
    }

    pub fn completed(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = self.operation,
            "Job completed: {}", message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_carries_job_identity() {
        let job_id = JobId::new();
        let logger = JobLogger::new(&job_id, "silence_removal");

        assert_eq!(logger.job_id, job_id.to_string());
        assert_eq!(logger.operation, "silence_removal");
    }

    #[test]
    fn test_span_is_reusable_across_stages() {
        let logger = JobLogger::new(&JobId::new(), "silence_removal");
        let span = logger.span();
        // Entering the same span twice must be legal (probe then stages)
        drop(span.enter());
        drop(span.enter());
    }
}
