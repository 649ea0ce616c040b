//! crosstalk - Core engine for speaker-attributed transcripts
//!
//! Aligns speech-recognition segments with speaker-diarization turns and
//! orchestrates the two engine calls behind them: concurrent execution,
//! retry/circuit protection, accelerated-compute fallback, and bounded job
//! admission.

pub mod alignment;
pub mod cli;
pub mod compute;
pub mod config;
pub mod engines;
pub mod pipeline;
pub mod queue;
pub mod retry;

use thiserror::Error;

/// Main error type for crosstalk
#[derive(Error, Debug)]
pub enum CrosstalkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] pipeline::PipelineError),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CrosstalkError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "crosstalk";
