//! Cooperative cancellation token
//!
//! Lightweight `Send + Sync + Clone` handle checked at defined checkpoints.
//! Cancellation never interrupts in-flight work; the work observes the token
//! at its next checkpoint and unwinds through the normal error path, so
//! scoped resources are still released.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::pipeline::PipelineError;

/// Shared cancellation flag for one job
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Err(Cancelled)` once cancellation has been requested
    pub fn checkpoint(&self) -> Result<(), PipelineError> {
        if self.is_cancelled() {
            return Err(PipelineError::cancelled("job cancelled"));
        }
        Ok(())
    }
}
