//! Time intervals and the arithmetic behind segment planning.
//!
//! All times are seconds from the start of the media file. The planner
//! works exclusively on sorted, pairwise non-overlapping interval lists;
//! `merge_intervals` is the normalizing step that establishes that shape,
//! `complement` inverts a silence list into keep regions, and
//! `clamp_intervals` bounds everything to `[0, duration]`.

use serde::{Deserialize, Serialize};

/// A half-open time span in seconds, `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

impl Interval {
    /// Create a new interval.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Duration of the interval in seconds.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Sort intervals by start and coalesce any pair that overlaps or is
/// separated by a gap of at most `gap_tolerance` seconds.
///
/// A tolerance of `0.0` merges only touching/overlapping intervals.
/// The speech segmenter passes a small positive tolerance so that
/// per-utterance output does not fragment the cut list into thousands
/// of micro-segments.
pub fn merge_intervals(mut intervals: Vec<Interval>, gap_tolerance: f64) -> Vec<Interval> {
    if intervals.is_empty() {
        return intervals;
    }

    intervals.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        match merged.last_mut() {
            Some(last) if iv.start <= last.end + gap_tolerance => {
                last.end = last.end.max(iv.end);
            }
            _ => merged.push(iv),
        }
    }
    merged
}

/// Compute the gaps between sorted, non-overlapping intervals within
/// `[0, duration]`.
///
/// Input must already be merged; callers normalize with
/// [`merge_intervals`] first. Intervals fully outside `[0, duration]`
/// contribute nothing.
pub fn complement(intervals: &[Interval], duration: f64) -> Vec<Interval> {
    let mut gaps = Vec::with_capacity(intervals.len() + 1);
    let mut cursor = 0.0_f64;

    for iv in intervals {
        let start = iv.start.max(0.0);
        let end = iv.end.min(duration);
        if start > cursor {
            gaps.push(Interval::new(cursor, start.min(duration)));
        }
        cursor = cursor.max(end);
        if cursor >= duration {
            break;
        }
    }

    if cursor < duration {
        gaps.push(Interval::new(cursor, duration));
    }

    gaps
}

/// Clamp every interval to `[0, duration]`, silently discarding any that
/// degenerates to `start >= end`.
pub fn clamp_intervals(intervals: Vec<Interval>, duration: f64) -> Vec<Interval> {
    intervals
        .into_iter()
        .map(|iv| Interval::new(iv.start.max(0.0), iv.end.min(duration)))
        .filter(|iv| iv.end > iv.start)
        .collect()
}
