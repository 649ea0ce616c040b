//! Accelerated/fallback compute dispatch

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::ComputeSettings;
use crate::pipeline::{CancelToken, PipelineError};

/// Routes a blocking operation to accelerated or fallback compute.
///
/// The accelerated resource is a single scarce unit: a single-permit
/// semaphore serializes accelerated attempts process-wide while fallback
/// calls run without limit. The permit is moved into the blocking closure,
/// so it is released on every exit path, including a panic inside the
/// operation.
pub struct ComputeDispatcher {
    /// Present only when accelerated compute is configured
    accelerated: Option<Arc<Semaphore>>,
    allow_fallback: bool,
}

impl ComputeDispatcher {
    pub fn new(settings: &ComputeSettings) -> Self {
        let accelerated = settings
            .use_accelerated
            .then(|| Arc::new(Semaphore::new(1)));
        Self {
            accelerated,
            allow_fallback: settings.allow_fallback,
        }
    }

    pub fn accelerated_available(&self) -> bool {
        self.accelerated.is_some()
    }

    /// Run `op(use_fallback)` on the accelerated path first, falling back
    /// once on failure when allowed. Returns the value and whether the
    /// fallback path produced it.
    pub async fn dispatch<T, F>(
        &self,
        operation: &str,
        cancel: &CancelToken,
        op: F,
    ) -> Result<(T, bool), PipelineError>
    where
        T: Send + 'static,
        F: Fn(bool) -> Result<T, PipelineError> + Send + Sync + 'static,
    {
        let op = Arc::new(op);

        let Some(accelerated) = &self.accelerated else {
            debug!(operation, "accelerated compute not configured, using fallback path");
            let value = run_blocking(operation, op, true).await?;
            return Ok((value, true));
        };

        cancel.checkpoint()?;

        // One accelerated call in flight process-wide. The permit travels
        // into the blocking closure and is dropped there.
        let permit = accelerated
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| PipelineError::permanent(operation, "accelerated resource closed"))?;

        let attempt = {
            let op = Arc::clone(&op);
            let operation = operation.to_string();
            tokio::task::spawn_blocking(move || {
                let _lease = permit;
                debug!(operation = %operation, "running on accelerated compute");
                op(false)
            })
            .await
        };

        let error = match flatten_join(operation, attempt) {
            Ok(value) => return Ok((value, false)),
            Err(error) => error,
        };

        let cancelled = matches!(error, PipelineError::Cancelled { .. });
        if !self.allow_fallback || cancelled {
            return Err(error);
        }

        warn!(
            operation,
            error = %error,
            "accelerated attempt failed, retrying on fallback compute"
        );
        cancel.checkpoint()?;

        // The fallback attempt's result is final; no further routing.
        let value = run_blocking(operation, op, true).await?;
        Ok((value, true))
    }
}

async fn run_blocking<T, F>(
    operation: &str,
    op: Arc<F>,
    use_fallback: bool,
) -> Result<T, PipelineError>
where
    T: Send + 'static,
    F: Fn(bool) -> Result<T, PipelineError> + Send + Sync + 'static,
{
    let attempt = tokio::task::spawn_blocking(move || op(use_fallback)).await;
    flatten_join(operation, attempt)
}

fn flatten_join<T>(
    operation: &str,
    joined: Result<Result<T, PipelineError>, tokio::task::JoinError>,
) -> Result<T, PipelineError> {
    match joined {
        Ok(result) => result,
        Err(join_error) => Err(PipelineError::permanent(
            operation,
            format!("compute worker aborted: {join_error}"),
        )),
    }
}
