//! Pipeline error taxonomy
//!
//! A closed set of tagged variants; the class of an error decides retry vs.
//! abort vs. degrade. Underlying subtask failures are preserved as boxed
//! cause chains rather than flattened into strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure taxonomy for the processing pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Retryable failure: rate limit, timeout, transport
    #[error("transient failure in {operation}: {message}")]
    Transient { operation: String, message: String },

    /// Non-retryable failure: bad input, auth, unsupported format
    #[error("permanent failure in {operation}: {message}")]
    Permanent { operation: String, message: String },

    /// A transient failure persisted past the retry budget
    #[error("{operation} still failing after {attempts} attempts: {last}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        last: Box<PipelineError>,
    },

    /// Rejected without an attempt: the circuit for this operation is open
    #[error("circuit open for {operation}, retry in {retry_after_secs}s")]
    CircuitOpen {
        operation: String,
        retry_after_secs: u64,
    },

    /// One of two subtasks failed; the job degrades and continues
    #[error("recoverable {operation} failure: {cause}")]
    PartialFailure {
        operation: String,
        #[source]
        cause: Box<PipelineError>,
    },

    /// Transcription failed, or both subtasks failed; the job aborts
    #[error("fatal join failure: {summary}")]
    FatalJoin {
        summary: String,
        transcription: Box<PipelineError>,
        diarization: Option<Box<PipelineError>>,
    },

    /// The job was cancelled at a cooperative checkpoint
    #[error("cancelled: {reason}")]
    Cancelled { reason: String },
}

impl PipelineError {
    pub fn transient(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn permanent(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Permanent {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// An exceeded per-attempt deadline, classified transient for retry purposes
    pub fn timeout(operation: impl Into<String>, timeout_secs: u64) -> Self {
        let operation = operation.into();
        Self::Transient {
            message: format!("{operation} attempt timed out after {timeout_secs}s"),
            operation,
        }
    }

    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled {
            reason: reason.into(),
        }
    }

    /// Join failure for the fatal cases: transcription down, or both
    /// subtasks down.
    pub fn fatal_join(transcription: PipelineError, diarization: Option<PipelineError>) -> Self {
        let summary = match &diarization {
            Some(d) => format!("transcription failed ({transcription}); diarization failed ({d})"),
            None => format!("transcription failed ({transcription})"),
        };
        Self::FatalJoin {
            summary,
            transcription: Box::new(transcription),
            diarization: diarization.map(Box::new),
        }
    }

    pub fn partial(operation: impl Into<String>, cause: PipelineError) -> Self {
        Self::PartialFailure {
            operation: operation.into(),
            cause: Box::new(cause),
        }
    }

    /// Classification used by the retry controller and the job queue
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Transient { .. } => ErrorClass::Transient,
            Self::Permanent { .. } => ErrorClass::Permanent,
            Self::RetriesExhausted { .. } => ErrorClass::RetriesExhausted,
            Self::CircuitOpen { .. } => ErrorClass::CircuitOpen,
            Self::PartialFailure { .. } => ErrorClass::PartialFailure,
            Self::FatalJoin { .. } => ErrorClass::FatalJoin,
            Self::Cancelled { .. } => ErrorClass::Cancelled,
        }
    }

    /// Only transient failures are retried locally
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Operation name carried by the variant, when it has one
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::Transient { operation, .. }
            | Self::Permanent { operation, .. }
            | Self::RetriesExhausted { operation, .. }
            | Self::CircuitOpen { operation, .. }
            | Self::PartialFailure { operation, .. } => Some(operation),
            Self::FatalJoin { .. } | Self::Cancelled { .. } => None,
        }
    }
}

/// Error class tags, serializable for observability records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Transient,
    Permanent,
    RetriesExhausted,
    CircuitOpen,
    PartialFailure,
    FatalJoin,
    Cancelled,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
            Self::RetriesExhausted => "retries_exhausted",
            Self::CircuitOpen => "circuit_open",
            Self::PartialFailure => "partial_failure",
            Self::FatalJoin => "fatal_join",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Flattened error record carried in `ProcessingOutcome.errors`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedError {
    /// Operation the failure belongs to (e.g. "diarization")
    pub operation: String,

    /// Taxonomy class
    pub class: ErrorClass,

    /// Human-readable description
    pub message: String,
}

impl ClassifiedError {
    pub fn from_error(operation: impl Into<String>, error: &PipelineError) -> Self {
        Self {
            operation: operation.into(),
            class: error.class(),
            message: error.to_string(),
        }
    }
}
