//! UNKNOWN gap interpolation

use super::{AlignedSegment, UNKNOWN_SPEAKER};

/// Fill short UNKNOWN gaps flanked by the same known speaker.
///
/// An interior UNKNOWN segment inherits its neighbors' label when both
/// neighbors carry the same non-UNKNOWN speaker and the time gap to each is
/// under `max_gap_secs`. Neighbor lookups read the pre-interpolation input,
/// so a fill never cascades into further fills within the same pass; a second
/// pass over the result is a no-op.
///
/// `overlap_ratio` is not recomputed for filled segments.
pub fn interpolate(aligned: Vec<AlignedSegment>, max_gap_secs: f64) -> Vec<AlignedSegment> {
    if aligned.len() < 3 {
        return aligned;
    }

    let snapshot = aligned.clone();
    let mut output = aligned;

    for i in 1..snapshot.len() - 1 {
        let current = &snapshot[i];
        if current.speaker != UNKNOWN_SPEAKER {
            continue;
        }

        let prev = &snapshot[i - 1];
        let next = &snapshot[i + 1];
        if prev.speaker == UNKNOWN_SPEAKER || prev.speaker != next.speaker {
            continue;
        }

        let gap_before = current.start - prev.end;
        let gap_after = next.start - current.end;
        if gap_before < max_gap_secs && gap_after < max_gap_secs {
            tracing::debug!(
                index = i,
                speaker = %prev.speaker,
                "interpolating unknown segment between matching neighbors"
            );
            output[i].speaker = prev.speaker.clone();
            output[i].interpolated = true;
        }
    }

    output
}
