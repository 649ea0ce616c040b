//! Per-operation circuit breaker state

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::RetrySettings;
use crate::pipeline::PipelineError;

/// Circuit health for one protected operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitHealth {
    /// Calls pass through
    Closed,
    /// Calls are rejected until the cool-down elapses
    Open,
    /// One probe call is allowed through
    HalfOpen,
}

#[derive(Debug)]
struct CircuitState {
    health: CircuitHealth,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    /// A half-open probe is outstanding
    probing: bool,
}

impl CircuitState {
    fn new() -> Self {
        Self {
            health: CircuitHealth::Closed,
            consecutive_failures: 0,
            opened_at: None,
            probing: false,
        }
    }
}

/// Read-only view of one circuit, for observability and tests
#[derive(Debug, Clone)]
pub struct CircuitSnapshot {
    pub health: CircuitHealth,
    pub consecutive_failures: u32,
}

/// Owned registry of circuit breakers, keyed by operation name.
///
/// Injected into the orchestrator rather than held as a process global, so
/// every test gets its own isolated instance. State for an operation is
/// created lazily on first use and lives as long as the registry.
pub struct CircuitBreakerRegistry {
    failure_threshold: u32,
    cooldown: Duration,
    circuits: Mutex<HashMap<String, CircuitState>>,
}

impl CircuitBreakerRegistry {
    pub fn new(settings: &RetrySettings) -> Self {
        Self {
            failure_threshold: settings.circuit_failure_threshold,
            cooldown: Duration::from_secs(settings.circuit_cooldown_secs),
            circuits: Mutex::new(HashMap::new()),
        }
    }

    /// Decide whether a call to `operation` may proceed.
    ///
    /// Open circuits reject immediately with `CircuitOpen`; a circuit whose
    /// cool-down has elapsed transitions to half-open and admits exactly one
    /// probe, rejecting concurrent callers until the probe resolves.
    pub async fn admit(&self, operation: &str) -> Result<(), PipelineError> {
        let mut circuits = self.circuits.lock().await;
        let state = circuits
            .entry(operation.to_string())
            .or_insert_with(CircuitState::new);

        match state.health {
            CircuitHealth::Closed => Ok(()),
            CircuitHealth::Open => {
                let elapsed = state
                    .opened_at
                    .map(|at| at.elapsed())
                    .unwrap_or(self.cooldown);
                if elapsed >= self.cooldown {
                    info!(operation, "circuit cool-down elapsed, admitting probe");
                    state.health = CircuitHealth::HalfOpen;
                    state.probing = true;
                    Ok(())
                } else {
                    let remaining = self.cooldown - elapsed;
                    Err(PipelineError::CircuitOpen {
                        operation: operation.to_string(),
                        retry_after_secs: remaining.as_secs().max(1),
                    })
                }
            }
            CircuitHealth::HalfOpen => {
                if state.probing {
                    Err(PipelineError::CircuitOpen {
                        operation: operation.to_string(),
                        retry_after_secs: 1,
                    })
                } else {
                    state.probing = true;
                    Ok(())
                }
            }
        }
    }

    /// Record a successful call: close the circuit, reset counters
    pub async fn record_success(&self, operation: &str) {
        let mut circuits = self.circuits.lock().await;
        let state = circuits
            .entry(operation.to_string())
            .or_insert_with(CircuitState::new);

        if state.health != CircuitHealth::Closed {
            info!(operation, "circuit closed after successful call");
        }
        state.health = CircuitHealth::Closed;
        state.consecutive_failures = 0;
        state.opened_at = None;
        state.probing = false;
    }

    /// Record a failed call, opening the circuit once the run of
    /// consecutive failures crosses the threshold
    pub async fn record_failure(&self, operation: &str) {
        let mut circuits = self.circuits.lock().await;
        let state = circuits
            .entry(operation.to_string())
            .or_insert_with(CircuitState::new);

        state.consecutive_failures += 1;

        match state.health {
            CircuitHealth::HalfOpen => {
                warn!(operation, "half-open probe failed, reopening circuit");
                state.health = CircuitHealth::Open;
                state.opened_at = Some(Instant::now());
                state.probing = false;
            }
            CircuitHealth::Closed if state.consecutive_failures >= self.failure_threshold => {
                warn!(
                    operation,
                    failures = state.consecutive_failures,
                    "failure threshold crossed, opening circuit"
                );
                state.health = CircuitHealth::Open;
                state.opened_at = Some(Instant::now());
            }
            _ => {}
        }
    }

    /// Snapshot one circuit's state, if it has been used
    pub async fn snapshot(&self, operation: &str) -> Option<CircuitSnapshot> {
        let circuits = self.circuits.lock().await;
        circuits.get(operation).map(|state| CircuitSnapshot {
            health: state.health,
            consecutive_failures: state.consecutive_failures,
        })
    }
}
