//! Pipeline orchestration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::alignment::{self, AlignedSegment};
use crate::compute::ComputeDispatcher;
use crate::config::Settings;
use crate::engines::{DiarizationEngine, SpeakerTurn, TimedSegment, TranscriptionEngine};
use crate::pipeline::{CancelToken, ClassifiedError, PipelineError};
use crate::retry::{guard, CircuitBreakerRegistry, RetryPolicy};

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(&str, f32) + Send + Sync>;

const OP_TRANSCRIPTION: &str = "transcription";
const OP_DIARIZATION: &str = "diarization";

/// Raw engine outputs plus how the job got them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingOutcome {
    /// Segments returned by the transcription engine
    pub transcript_segments: Vec<TimedSegment>,

    /// Turns returned by the diarization engine; empty in degraded mode
    pub speaker_turns: Vec<SpeakerTurn>,

    /// True when either subtask ran on the fallback compute path
    pub used_fallback_compute: bool,

    /// Recoverable failures absorbed along the way
    pub errors: Vec<ClassifiedError>,
}

/// Final data contract handed to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedTranscript {
    pub outcome: ProcessingOutcome,

    /// Speaker-labeled segments, 1:1 with the transcript segments
    pub segments: Vec<AlignedSegment>,
}

/// Runs one audio reference through transcription, diarization, and
/// alignment.
///
/// The two engine subtasks run concurrently with no ordering dependency;
/// each is individually wrapped by the retry/circuit controller and routed
/// through the compute dispatcher. Join policy: transcription is mandatory
/// (its failure aborts the job), diarization is best-effort (its failure
/// degrades the job to an all-UNKNOWN transcript).
pub struct Orchestrator {
    settings: Settings,
    transcriber: Arc<dyn TranscriptionEngine>,
    diarizer: Arc<dyn DiarizationEngine>,
    dispatcher: Arc<ComputeDispatcher>,
    circuits: Arc<CircuitBreakerRegistry>,
}

impl Orchestrator {
    pub fn new(
        settings: Settings,
        transcriber: Arc<dyn TranscriptionEngine>,
        diarizer: Arc<dyn DiarizationEngine>,
        circuits: Arc<CircuitBreakerRegistry>,
    ) -> Self {
        let dispatcher = Arc::new(ComputeDispatcher::new(&settings.compute));
        Self {
            settings,
            transcriber,
            diarizer,
            dispatcher,
            circuits,
        }
    }

    /// Process one audio reference into a speaker-labeled transcript
    pub async fn process(
        &self,
        audio: &Path,
        cancel: &CancelToken,
        progress: &ProgressCallback,
    ) -> Result<ProcessedTranscript, PipelineError> {
        cancel.checkpoint()?;
        progress("engines", 0.1);
        info!(audio = %audio.display(), "processing started");

        let policy = RetryPolicy::from_settings(&self.settings.retry);

        let transcription = self.run_transcription(audio, &policy, cancel);
        let diarization = self.run_diarization(audio, &policy, cancel);
        let (transcription, diarization) = tokio::join!(transcription, diarization);

        cancel.checkpoint()?;
        progress("alignment", 0.8);

        let mut used_fallback = false;
        let mut errors = Vec::new();

        let (segments, t_fallback) = match transcription {
            Ok(ok) => ok,
            Err(t_err) => {
                // Transcript text is mandatory; a successful diarization
                // result is discarded on this path.
                return Err(PipelineError::fatal_join(t_err, diarization.err()));
            }
        };
        used_fallback |= t_fallback;

        let turns = match diarization {
            Ok((turns, d_fallback)) => {
                used_fallback |= d_fallback;
                turns
            }
            Err(d_err) => {
                warn!(error = %d_err, "diarization failed, continuing without speakers");
                errors.push(ClassifiedError::from_error(
                    OP_DIARIZATION,
                    &PipelineError::partial(OP_DIARIZATION, d_err),
                ));
                Vec::new()
            }
        };

        let aligned = alignment::align(&segments, &turns, &self.settings.alignment);
        let aligned = alignment::interpolate(
            aligned,
            self.settings.alignment.interpolation_max_gap_secs,
        );

        progress("done", 1.0);
        info!(
            segments = aligned.len(),
            turns = turns.len(),
            used_fallback,
            degraded = !errors.is_empty(),
            "processing finished"
        );

        Ok(ProcessedTranscript {
            outcome: ProcessingOutcome {
                transcript_segments: segments,
                speaker_turns: turns,
                used_fallback_compute: used_fallback,
                errors,
            },
            segments: aligned,
        })
    }

    async fn run_transcription(
        &self,
        audio: &Path,
        policy: &RetryPolicy,
        cancel: &CancelToken,
    ) -> Result<(Vec<TimedSegment>, bool), PipelineError> {
        let audio: PathBuf = audio.to_path_buf();
        guard(&self.circuits, OP_TRANSCRIPTION, policy, cancel, || {
            let engine = Arc::clone(&self.transcriber);
            let audio = audio.clone();
            async move {
                self.dispatcher
                    .dispatch(OP_TRANSCRIPTION, cancel, move |use_fallback| {
                        engine.transcribe(&audio, use_fallback)
                    })
                    .await
            }
        })
        .await
    }

    async fn run_diarization(
        &self,
        audio: &Path,
        policy: &RetryPolicy,
        cancel: &CancelToken,
    ) -> Result<(Vec<SpeakerTurn>, bool), PipelineError> {
        let audio: PathBuf = audio.to_path_buf();
        let num_speakers = self.settings.diarization.num_speakers_hint();
        guard(&self.circuits, OP_DIARIZATION, policy, cancel, || {
            let engine = Arc::clone(&self.diarizer);
            let audio = audio.clone();
            async move {
                self.dispatcher
                    .dispatch(OP_DIARIZATION, cancel, move |use_fallback| {
                        engine.diarize(&audio, num_speakers, use_fallback)
                    })
                    .await
            }
        })
        .await
    }
}
