//! Overlap-ratio speaker assignment

use crate::config::AlignmentSettings;
use crate::engines::{SpeakerTurn, TimedSegment};

use super::AlignedSegment;

/// Assign a speaker to every segment.
///
/// Primary rule: the turn with the strictly largest overlap wins when its
/// overlap covers at least `overlap_threshold` of the segment's duration.
/// Ties keep the first turn in input order, a deterministic tie-break, not a
/// quality judgement. Segments that miss the threshold fall back to the
/// nearest turn within `nearest_fallback_max_distance_secs` when the fallback
/// is enabled, and to [`super::UNKNOWN_SPEAKER`] otherwise.
///
/// The output is 1:1 with the input: same order, same count, no drops.
pub fn align(
    segments: &[TimedSegment],
    turns: &[SpeakerTurn],
    settings: &AlignmentSettings,
) -> Vec<AlignedSegment> {
    segments
        .iter()
        .map(|segment| align_segment(segment, turns, settings))
        .collect()
}

fn align_segment(
    segment: &TimedSegment,
    turns: &[SpeakerTurn],
    settings: &AlignmentSettings,
) -> AlignedSegment {
    let duration = segment.duration();

    // Strictly-greater comparison keeps the first turn on ties.
    let mut best: Option<(&SpeakerTurn, f64)> = None;
    for turn in turns {
        let overlap = overlap_seconds(segment, turn);
        match best {
            Some((_, best_overlap)) if overlap <= best_overlap => {}
            _ => best = Some((turn, overlap)),
        }
    }

    // Zero-duration segments have no defined ratio and always fall through.
    if duration > 0.0 {
        if let Some((turn, overlap)) = best {
            let ratio = overlap / duration;
            if ratio >= settings.overlap_threshold {
                return AlignedSegment::attributed(segment, turn.speaker_id.clone(), ratio);
            }
        }
    }

    if settings.use_nearest_fallback {
        if let Some((turn, distance)) = nearest_turn(segment, turns) {
            if distance < settings.nearest_fallback_max_distance_secs {
                return AlignedSegment::attributed(segment, turn.speaker_id.clone(), 0.0);
            }
        }
    }

    AlignedSegment::unknown(segment)
}

fn overlap_seconds(segment: &TimedSegment, turn: &SpeakerTurn) -> f64 {
    (segment.end.min(turn.end) - segment.start.max(turn.start)).max(0.0)
}

/// Distance from a segment to a turn.
///
/// Disjoint spans measure the gap between their nearer edges. Overlapping
/// spans use the smaller edge-to-edge distance as an approximation; the
/// formula is preserved as observed in the source system, not normalized.
fn edge_distance(segment: &TimedSegment, turn: &SpeakerTurn) -> f64 {
    if segment.end <= turn.start {
        turn.start - segment.end
    } else if segment.start >= turn.end {
        segment.start - turn.end
    } else {
        (segment.start - turn.end)
            .abs()
            .min((segment.end - turn.start).abs())
    }
}

fn nearest_turn<'a>(
    segment: &TimedSegment,
    turns: &'a [SpeakerTurn],
) -> Option<(&'a SpeakerTurn, f64)> {
    let mut nearest: Option<(&SpeakerTurn, f64)> = None;
    for turn in turns {
        let distance = edge_distance(segment, turn);
        match nearest {
            Some((_, best)) if distance >= best => {}
            _ => nearest = Some((turn, distance)),
        }
    }
    nearest
}
