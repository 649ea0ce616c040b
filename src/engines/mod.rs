//! Engine collaborator interfaces
//!
//! The speech-to-text and diarization engines are external collaborators.
//! Both are blocking calls; the compute dispatcher offloads them to the
//! blocking thread pool and handles accelerated/fallback routing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineError;

/// A timestamped span of recognized speech text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedSegment {
    /// Start time in seconds from the beginning of the audio
    pub start: f64,

    /// End time in seconds (end >= start)
    pub end: f64,

    /// Recognized text
    pub text: String,
}

impl TimedSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Segment duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A timestamped span attributed to one speaker by the diarization engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerTurn {
    /// Start time in seconds
    pub start: f64,

    /// End time in seconds
    pub end: f64,

    /// Speaker identifier; multiple turns may share one
    pub speaker_id: String,
}

impl SpeakerTurn {
    pub fn new(start: f64, end: f64, speaker_id: impl Into<String>) -> Self {
        Self {
            start,
            end,
            speaker_id: speaker_id.into(),
        }
    }
}

/// Speech-to-text collaborator
///
/// `use_fallback_compute` selects the slower always-available compute path
/// instead of the accelerated one. Implementations signal transient errors
/// (rate limit, timeout, transport) or permanent errors (unsupported format,
/// auth) through the [`PipelineError`] taxonomy.
pub trait TranscriptionEngine: Send + Sync {
    fn transcribe(
        &self,
        audio: &Path,
        use_fallback_compute: bool,
    ) -> std::result::Result<Vec<TimedSegment>, PipelineError>;
}

/// Speaker-diarization collaborator
///
/// `num_speakers` of `None` lets the engine auto-detect the speaker count.
pub trait DiarizationEngine: Send + Sync {
    fn diarize(
        &self,
        audio: &Path,
        num_speakers: Option<usize>,
        use_fallback_compute: bool,
    ) -> std::result::Result<Vec<SpeakerTurn>, PipelineError>;
}
