//! Processing pipeline for crosstalk
//!
//! Orchestrates the transcription and diarization subtasks and carries the
//! error taxonomy and cancellation primitives they share.

mod cancel;
mod error;
mod orchestrator;

pub use cancel::CancelToken;
pub use error::{ClassifiedError, ErrorClass, PipelineError};
pub use orchestrator::{Orchestrator, ProcessedTranscript, ProcessingOutcome, ProgressCallback};
