//! Bounded retry with jittered exponential backoff

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::config::RetrySettings;
use crate::pipeline::{CancelToken, PipelineError};

use super::CircuitBreakerRegistry;

/// Retry parameters for one protected operation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 means a single attempt
    pub max_retries: u32,

    /// Base delay, doubled per attempt
    pub base_backoff: Duration,

    /// Independent deadline for each attempt
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_backoff: Duration::from_millis(settings.base_backoff_ms),
            attempt_timeout: Duration::from_secs(settings.attempt_timeout_secs),
        }
    }

    /// `base * 2^attempt` plus up to 30% random jitter
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponential = self.base_backoff.saturating_mul(1u32 << attempt.min(16));
        let jitter = rand::thread_rng().gen_range(0.0..0.3);
        exponential.mul_f64(1.0 + jitter)
    }
}

/// Run `f` under the circuit breaker for `operation`, retrying transient
/// failures with exponential backoff.
///
/// Permanent failures return immediately. A transient failure that outlives
/// the retry budget surfaces as `RetriesExhausted` carrying the attempt
/// count and the last underlying error, distinguishable from a single
/// permanent failure. Every attempt runs under its own deadline; exceeding
/// it counts as transient.
pub async fn guard<T, F, Fut>(
    circuits: &CircuitBreakerRegistry,
    operation: &str,
    policy: &RetryPolicy,
    cancel: &CancelToken,
    f: F,
) -> Result<T, PipelineError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let mut attempt: u32 = 0;

    loop {
        cancel.checkpoint()?;
        circuits.admit(operation).await?;

        let outcome = match tokio::time::timeout(policy.attempt_timeout, f()).await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::timeout(
                operation,
                policy.attempt_timeout.as_secs(),
            )),
        };

        match outcome {
            Ok(value) => {
                circuits.record_success(operation).await;
                return Ok(value);
            }
            Err(error) => {
                circuits.record_failure(operation).await;

                if !error.is_retryable() {
                    return Err(error);
                }
                if attempt >= policy.max_retries {
                    return Err(PipelineError::RetriesExhausted {
                        operation: operation.to_string(),
                        attempts: attempt + 1,
                        last: Box::new(error),
                    });
                }

                let delay = policy.backoff_delay(attempt);
                warn!(
                    operation,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "transient failure, backing off before retry"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
