//! Processing job record and its state machine.
//!
//! `PENDING -> PROCESSING -> {COMPLETED, FAILED}`, terminal states
//! absorbing. The record is created by the submission layer; the worker
//! mutates it only through the transition methods while a job runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::Tier;

/// Unique identifier for a processing job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Processing status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is waiting for a worker.
    #[default]
    Pending,
    /// Job is being processed.
    Processing,
    /// Job completed successfully.
    Completed,
    /// Job failed; the error fields carry the reason.
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A silence-removal job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingJob {
    /// Unique job ID.
    pub id: JobId,

    /// Path to the uploaded input file.
    pub input_path: PathBuf,

    /// Billing tier selecting the detection strategy.
    pub tier: Tier,

    /// Current status.
    #[serde(default)]
    pub status: JobStatus,

    /// Path of the produced output file (set on completion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    /// Machine-readable error kind (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,

    /// Error message, verbatim from the failing stage (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,

    /// Started at timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// Completed at timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProcessingJob {
    /// Create a new pending job.
    pub fn new(input_path: impl Into<PathBuf>, tier: Tier) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            input_path: input_path.into(),
            tier,
            status: JobStatus::Pending,
            output_path: None,
            error_kind: None,
            error_message: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        }
    }

    /// Pick up the job for processing.
    pub fn start(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Processing;
        self.started_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Mark the job as completed with its output file.
    pub fn complete(&mut self, output_path: impl Into<PathBuf>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Completed;
        self.output_path = Some(output_path.into());
        self.completed_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Mark the job as failed with the originating error.
    pub fn fail(&mut self, kind: impl Into<String>, message: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Failed;
        self.error_kind = Some(kind.into());
        self.error_message = Some(message.into());
        self.completed_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Check if the job reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
