//! Silence-removal job worker.
//!
//! Drives one job at a time through the tier-dispatched pipeline:
//! probe, tier cap check, detection, segment planning, filter graph
//! compilation, and the final transcode.

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod store;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use pipeline::{DetectionStrategy, JobRequest, JobRunner};
pub use store::{JobStore, MemoryJobStore};
