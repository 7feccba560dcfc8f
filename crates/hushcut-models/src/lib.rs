//! Shared data models for the HushCut backend.
//!
//! Pure domain types with no I/O: time intervals and the interval
//! arithmetic used by segment planning, the processing job record,
//! and the billing tier.

pub mod interval;
pub mod job;
pub mod tier;

pub use interval::{clamp_intervals, complement, merge_intervals, Interval};
pub use job::{JobId, JobStatus, ProcessingJob};
pub use tier::{Tier, TierParseError};
