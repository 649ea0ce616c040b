//! Adjacent same-speaker segment merging
//!
//! Presentation pass: collapses runs of segments from one speaker into a
//! single span so rendered transcripts read as turns rather than fragments.
//! Never applied by the pipeline itself; callers opt in after alignment.

use super::AlignedSegment;

/// Merge consecutive segments with the same speaker when the gap between
/// them is under `max_gap_secs`.
pub fn merge_adjacent(aligned: Vec<AlignedSegment>, max_gap_secs: f64) -> Vec<AlignedSegment> {
    if aligned.is_empty() {
        return aligned;
    }

    let mut iter = aligned.into_iter();
    let mut merged = Vec::new();
    let mut current = iter.next().expect("checked non-empty");

    for segment in iter {
        let gap = segment.start - current.end;

        if gap < max_gap_secs && current.speaker == segment.speaker {
            current.end = segment.end;
            current.text.push(' ');
            current.text.push_str(&segment.text);
            current.overlap_ratio = current.overlap_ratio.max(segment.overlap_ratio);
            current.interpolated = current.interpolated && segment.interpolated;
        } else {
            merged.push(current);
            current = segment;
        }
    }

    merged.push(current);
    merged
}
