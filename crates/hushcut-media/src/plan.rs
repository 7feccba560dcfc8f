//! Segment planning: detector output to keep-intervals.
//!
//! Both detection strategies converge here into a single canonical
//! `SegmentPlan`: an ordered, non-overlapping list of intervals to keep,
//! plus a copy-through flag for the no-speech degenerate case.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use hushcut_models::{clamp_intervals, complement, merge_intervals, Interval};

/// Minimal keep length when the whole clip is silent, in seconds.
///
/// Keeps downstream encoding from being handed an empty cut list.
const MIN_KEEP_SECS: f64 = 0.1;

/// The canonical planner output, detector-agnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPlan {
    /// Intervals to keep, sorted ascending, pairwise non-overlapping,
    /// bounded within `[0, duration]`.
    pub intervals: Vec<Interval>,
    /// True when no speech was detected and the output should be a
    /// direct stream copy instead of per-segment trimming.
    pub copy_through: bool,
}

impl SegmentPlan {
    /// Total kept duration in seconds.
    pub fn kept_duration(&self) -> f64 {
        self.intervals.iter().map(Interval::duration).sum()
    }

    /// Check the planner invariants: non-empty, sorted, non-overlapping.
    ///
    /// The merge/complement steps guarantee these hold; a violation here
    /// is a bug in the planner, not a data problem.
    pub fn validate(&self) -> Result<(), String> {
        if self.intervals.is_empty() {
            return Err("plan contains no intervals".to_string());
        }
        for pair in self.intervals.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(format!(
                    "intervals out of order or overlapping: ({}, {}) then ({}, {})",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                ));
            }
        }
        Ok(())
    }
}

/// Plan keep-intervals from detected silence (basic tier).
///
/// `keep = complement(merge(silence), [0, duration])`. A fully-silent
/// clip yields a single minimal interval rather than an empty plan.
pub fn plan_from_silence(silence: Vec<Interval>, duration: f64) -> SegmentPlan {
    let silence = clamp_intervals(silence, duration);
    let merged = merge_intervals(silence, 0.0);
    let mut keep = complement(&merged, duration);

    if keep.is_empty() {
        // Entire clip is silence; keep a sliver so encoding has content
        warn!(duration = duration, "Entire clip is silent, keeping minimal interval");
        keep.push(Interval::new(0.0, MIN_KEEP_SECS.min(duration)));
    }

    debug!(
        keep_intervals = keep.len(),
        kept_secs = keep.iter().map(Interval::duration).sum::<f64>(),
        "Planned keep intervals from silence"
    );

    SegmentPlan {
        intervals: keep,
        copy_through: false,
    }
}

/// Plan keep-intervals from detected speech (premium tier).
///
/// Speech intervals already are the keep regions. When no speech was
/// detected the plan degenerates to copying the whole clip through.
pub fn plan_from_speech(speech: Vec<Interval>, duration: f64) -> SegmentPlan {
    let speech = clamp_intervals(speech, duration);
    let keep = merge_intervals(speech, 0.0);

    if keep.is_empty() {
        debug!(duration = duration, "No speech detected, planning copy-through");
        return SegmentPlan {
            intervals: vec![Interval::new(0.0, duration)],
            copy_through: true,
        };
    }

    debug!(
        keep_intervals = keep.len(),
        kept_secs = keep.iter().map(Interval::duration).sum::<f64>(),
        "Planned keep intervals from speech"
    );

    SegmentPlan {
        intervals: keep,
        copy_through: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: f64, end: f64) -> Interval {
        Interval::new(start, end)
    }

    #[test]
    fn test_plan_from_silence_example() {
        let plan = plan_from_silence(vec![iv(2.0, 4.0), iv(10.0, 11.5)], 15.0);
        assert_eq!(
            plan.intervals,
            vec![iv(0.0, 2.0), iv(4.0, 10.0), iv(11.5, 15.0)]
        );
        assert!(!plan.copy_through);
        plan.validate().unwrap();
    }

    #[test]
    fn test_plan_no_silence_keeps_everything() {
        let plan = plan_from_silence(vec![], 12.0);
        assert_eq!(plan.intervals, vec![iv(0.0, 12.0)]);
        assert!(!plan.copy_through);
    }

    #[test]
    fn test_plan_fully_silent_keeps_sliver() {
        let plan = plan_from_silence(vec![iv(0.0, 30.0)], 30.0);
        assert_eq!(plan.intervals.len(), 1);
        assert!((plan.kept_duration() - 0.1).abs() < 1e-9);
        assert!(!plan.copy_through);
        plan.validate().unwrap();
    }

    #[test]
    fn test_plan_silence_clamped_and_merged() {
        // Overlapping silence past the end of the clip
        let plan = plan_from_silence(vec![iv(5.0, 8.0), iv(7.0, 20.0)], 10.0);
        assert_eq!(plan.intervals, vec![iv(0.0, 5.0)]);
    }

    #[test]
    fn test_plan_degenerate_silence_discarded() {
        // Interval entirely past the end clamps to nothing
        let plan = plan_from_silence(vec![iv(12.0, 14.0)], 10.0);
        assert_eq!(plan.intervals, vec![iv(0.0, 10.0)]);
    }

    #[test]
    fn test_plan_from_speech_direct() {
        let plan = plan_from_speech(vec![iv(1.0, 3.0), iv(5.0, 9.0)], 10.0);
        assert_eq!(plan.intervals, vec![iv(1.0, 3.0), iv(5.0, 9.0)]);
        assert!(!plan.copy_through);
        plan.validate().unwrap();
    }

    #[test]
    fn test_plan_no_speech_is_copy_through() {
        let plan = plan_from_speech(vec![], 42.0);
        assert!(plan.copy_through);
        assert_eq!(plan.intervals, vec![iv(0.0, 42.0)]);
        plan.validate().unwrap();
    }

    #[test]
    fn test_plan_speech_overlaps_merged() {
        let plan = plan_from_speech(vec![iv(0.0, 2.0), iv(1.5, 4.0)], 10.0);
        assert_eq!(plan.intervals, vec![iv(0.0, 4.0)]);
    }

    #[test]
    fn test_plan_bounded_within_duration() {
        let plan = plan_from_speech(vec![iv(-2.0, 3.0), iv(8.0, 99.0)], 10.0);
        assert_eq!(plan.intervals, vec![iv(0.0, 3.0), iv(8.0, 10.0)]);
        assert!(plan.kept_duration() <= 10.0);
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let plan = SegmentPlan {
            intervals: vec![iv(0.0, 5.0), iv(4.0, 6.0)],
            copy_through: false,
        };
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty() {
        let plan = SegmentPlan {
            intervals: vec![],
            copy_through: false,
        };
        assert!(plan.validate().is_err());
    }
}
