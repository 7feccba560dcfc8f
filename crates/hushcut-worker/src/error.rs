//! Worker error types.
//!
//! Each variant is a stage-level error kind; `kind()` is the
//! machine-readable string stored on the job record next to the
//! verbatim message.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Tier violation: {0}")]
    TierViolation(String),

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("Planning invariant violated: {0}")]
    Planning(String),

    #[error("Transcode failed: {0}")]
    Transcode(String),

    #[error("Probe failed: {0}")]
    Probe(String),

    #[error("Job store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn tier_violation(msg: impl Into<String>) -> Self {
        Self::TierViolation(msg.into())
    }

    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection(msg.into())
    }

    pub fn transcode(msg: impl Into<String>) -> Self {
        Self::Transcode(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Machine-readable error kind for the job record.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerError::TierViolation(_) => "tier_violation",
            WorkerError::Detection(_) => "detection",
            WorkerError::Planning(_) => "planning",
            WorkerError::Transcode(_) => "transcode",
            WorkerError::Probe(_) => "probe",
            WorkerError::Store(_) => "store",
            WorkerError::Config(_) => "config",
            WorkerError::Io(_) => "io",
        }
    }

    /// The message without the kind prefix, as the failing stage
    /// produced it.
    pub fn stage_message(&self) -> String {
        match self {
            WorkerError::TierViolation(m)
            | WorkerError::Detection(m)
            | WorkerError::Planning(m)
            | WorkerError::Transcode(m)
            | WorkerError::Probe(m)
            | WorkerError::Store(m)
            | WorkerError::Config(m) => m.clone(),
            WorkerError::Io(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(WorkerError::tier_violation("x").kind(), "tier_violation");
        assert_eq!(WorkerError::detection("x").kind(), "detection");
        assert_eq!(WorkerError::Planning("x".into()).kind(), "planning");
        assert_eq!(WorkerError::transcode("x").kind(), "transcode");
    }

    #[test]
    fn test_stage_message_is_verbatim() {
        let err = WorkerError::detection("ffmpeg exited with code 1");
        assert_eq!(err.stage_message(), "ffmpeg exited with code 1");
    }
}
