//! Bounded-concurrency job scheduler

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{oneshot, Mutex, Semaphore};
use tracing::{debug, info, warn};

use crate::pipeline::{CancelToken, PipelineError};
use crate::queue::{JobRecord, JobStatus};
use crate::CrosstalkError;

struct JobEntry {
    record: JobRecord,
    cancel: CancelToken,
}

struct QueueInner {
    jobs: Mutex<HashMap<String, JobEntry>>,
    slots: Arc<Semaphore>,
}

impl QueueInner {
    /// Apply a monotonic status transition; silently keeps terminal states
    async fn transition(&self, job_id: &str, next: JobStatus) {
        let mut jobs = self.jobs.lock().await;
        let Some(entry) = jobs.get_mut(job_id) else {
            return;
        };

        if !entry.record.status.can_transition_to(next) {
            debug!(
                job_id,
                from = entry.record.status.as_str(),
                to = next.as_str(),
                "ignoring non-monotonic job transition"
            );
            return;
        }

        entry.record.status = next;
        match next {
            JobStatus::Running => entry.record.started_at = Some(Utc::now()),
            status if status.is_terminal() => entry.record.completed_at = Some(Utc::now()),
            _ => {}
        }
    }

    async fn set_error(&self, job_id: &str, message: String) {
        let mut jobs = self.jobs.lock().await;
        if let Some(entry) = jobs.get_mut(job_id) {
            entry.record.error = Some(message);
        }
    }

    async fn set_progress(&self, job_id: &str, stage: &str, progress: f32) {
        let mut jobs = self.jobs.lock().await;
        if let Some(entry) = jobs.get_mut(job_id) {
            if !entry.record.status.is_terminal() {
                entry.record.stage = stage.to_string();
                entry.record.progress = progress.clamp(0.0, 1.0);
            }
        }
    }
}

/// Handed to the running work: cancellation plus progress reporting
#[derive(Clone)]
pub struct JobContext {
    job_id: String,
    cancel: CancelToken,
    inner: Arc<QueueInner>,
}

impl JobContext {
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Mirror a stage label and fractional progress into the job record
    pub async fn set_progress(&self, stage: &str, progress: f32) {
        self.inner.set_progress(&self.job_id, stage, progress).await;
    }
}

/// Await the final result of a submitted job
pub struct JobHandle<T> {
    pub id: String,
    done: oneshot::Receiver<Result<T, PipelineError>>,
}

impl<T> JobHandle<T> {
    /// Resolve to the job's outcome. A job whose work never ran (cancelled
    /// while pending) resolves to `Cancelled`.
    pub async fn outcome(self) -> Result<T, PipelineError> {
        match self.done.await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::cancelled("job abandoned before completion")),
        }
    }
}

/// Bounded-concurrency job scheduler.
///
/// At most `max_concurrent` jobs run simultaneously; excess submissions wait
/// in `Pending` until a slot frees. The job table is the single source of
/// truth for lifecycle state; records are removed only by explicit
/// [`AdmissionQueue::evict`].
pub struct AdmissionQueue {
    inner: Arc<QueueInner>,
}

impl AdmissionQueue {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                jobs: Mutex::new(HashMap::new()),
                slots: Arc::new(Semaphore::new(max_concurrent.max(1))),
            }),
        }
    }

    /// Accept a job. The work receives a [`JobContext`] and starts once a
    /// slot is free; duplicate ids are rejected.
    pub async fn submit<T, F, Fut>(
        &self,
        job_id: impl Into<String>,
        work: F,
    ) -> crate::Result<JobHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce(JobContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, PipelineError>> + Send + 'static,
    {
        let job_id = job_id.into();
        let cancel = CancelToken::new();

        {
            let mut jobs = self.inner.jobs.lock().await;
            if jobs.contains_key(&job_id) {
                return Err(CrosstalkError::Queue(format!(
                    "job id already submitted: {job_id}"
                )));
            }
            jobs.insert(
                job_id.clone(),
                JobEntry {
                    record: JobRecord::new(&job_id),
                    cancel: cancel.clone(),
                },
            );
        }

        info!(job_id, "job accepted");

        let (done_tx, done_rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        let task_job_id = job_id.clone();

        tokio::spawn(async move {
            let permit = match inner.slots.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            // Cancelled while pending: never start the work.
            if cancel.is_cancelled() {
                drop(permit);
                let _ = done_tx.send(Err(PipelineError::cancelled("cancelled while pending")));
                return;
            }

            inner.transition(&task_job_id, JobStatus::Running).await;
            debug!(job_id = %task_job_id, "job started");

            let context = JobContext {
                job_id: task_job_id.clone(),
                cancel: cancel.clone(),
                inner: Arc::clone(&inner),
            };
            let result = work(context).await;

            // Free the slot before any caller-visible notification so the
            // next pending job can start immediately.
            drop(permit);

            match &result {
                Ok(_) => {
                    inner.transition(&task_job_id, JobStatus::Completed).await;
                    info!(job_id = %task_job_id, "job completed");
                }
                Err(PipelineError::Cancelled { .. }) => {
                    inner.transition(&task_job_id, JobStatus::Cancelled).await;
                    info!(job_id = %task_job_id, "job cancelled");
                }
                Err(error) => {
                    inner.set_error(&task_job_id, error.to_string()).await;
                    inner.transition(&task_job_id, JobStatus::Failed).await;
                    warn!(job_id = %task_job_id, error = %error, "job failed");
                }
            }

            let _ = done_tx.send(result);
        });

        Ok(JobHandle { id: job_id, done: done_rx })
    }

    /// Current record for a job, if it exists
    pub async fn status(&self, job_id: &str) -> Option<JobRecord> {
        let jobs = self.inner.jobs.lock().await;
        jobs.get(job_id).map(|entry| entry.record.clone())
    }

    /// Request cooperative cancellation of a pending or running job.
    /// Returns false for unknown jobs and jobs already in a terminal state.
    pub async fn cancel(&self, job_id: &str) -> bool {
        let mut jobs = self.inner.jobs.lock().await;
        let Some(entry) = jobs.get_mut(job_id) else {
            return false;
        };
        if entry.record.status.is_terminal() {
            return false;
        }

        entry.cancel.cancel();
        entry.record.status = JobStatus::Cancelled;
        entry.record.completed_at = Some(Utc::now());
        info!(job_id, "cancellation requested");
        true
    }

    /// Remove a job record. The queue never evicts on its own.
    pub async fn evict(&self, job_id: &str) -> bool {
        let mut jobs = self.inner.jobs.lock().await;
        jobs.remove(job_id).is_some()
    }

    /// Number of jobs currently in `Running`
    pub async fn running_count(&self) -> usize {
        let jobs = self.inner.jobs.lock().await;
        jobs.values()
            .filter(|entry| entry.record.status == JobStatus::Running)
            .count()
    }

    /// All job records, for status listings
    pub async fn records(&self) -> Vec<JobRecord> {
        let jobs = self.inner.jobs.lock().await;
        jobs.values().map(|entry| entry.record.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn completed_job_reports_result_and_record() {
        let queue = AdmissionQueue::new(2);

        let handle = queue
            .submit("job-1", |_ctx| async { Ok::<_, PipelineError>(41 + 1) })
            .await
            .expect("submit accepted");

        assert_eq!(handle.outcome().await.expect("job succeeds"), 42);

        let record = queue.status("job-1").await.expect("record exists");
        assert_eq!(record.status, JobStatus::Completed);
        assert!(record.completed_at.is_some());
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let queue = AdmissionQueue::new(2);

        let _first = queue
            .submit("job-1", |_ctx| async { Ok::<_, PipelineError>(()) })
            .await
            .expect("first submit accepted");

        let second = queue
            .submit("job-1", |_ctx| async { Ok::<_, PipelineError>(()) })
            .await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn failed_job_records_error_text() {
        let queue = AdmissionQueue::new(1);

        let handle = queue
            .submit("job-1", |_ctx| async {
                Err::<(), _>(PipelineError::permanent("transcription", "bad input"))
            })
            .await
            .expect("submit accepted");

        assert!(handle.outcome().await.is_err());
        let record = queue.status("job-1").await.expect("record exists");
        assert_eq!(record.status, JobStatus::Failed);
        assert!(record.error.expect("error text").contains("bad input"));
    }

    #[tokio::test]
    async fn cancel_on_terminal_job_is_a_no_op() {
        let queue = AdmissionQueue::new(1);

        let handle = queue
            .submit("job-1", |_ctx| async { Ok::<_, PipelineError>(()) })
            .await
            .expect("submit accepted");
        handle.outcome().await.expect("job completes");

        assert!(!queue.cancel("job-1").await);
        assert!(!queue.cancel("missing").await);
    }

    #[tokio::test]
    async fn eviction_is_caller_driven() {
        let queue = AdmissionQueue::new(1);

        let handle = queue
            .submit("job-1", |_ctx| async { Ok::<_, PipelineError>(()) })
            .await
            .expect("submit accepted");
        handle.outcome().await.expect("job completes");

        // Terminal records stay until the caller evicts them.
        assert!(queue.status("job-1").await.is_some());
        assert!(queue.evict("job-1").await);
        assert!(queue.status("job-1").await.is_none());
        assert!(!queue.evict("job-1").await);
    }

    #[tokio::test]
    async fn progress_updates_reach_the_record() {
        let queue = AdmissionQueue::new(1);
        let (observed_tx, observed_rx) = tokio::sync::oneshot::channel::<()>();

        let handle = queue
            .submit("job-1", |ctx| async move {
                ctx.set_progress("aligning", 0.8).await;
                // Hold the job open until the test has read the record.
                let _ = observed_rx.await;
                Ok::<_, PipelineError>(())
            })
            .await
            .expect("submit accepted");

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let record = queue.status("job-1").await.expect("record exists");
            if record.stage == "aligning" {
                assert!((record.progress - 0.8).abs() < f32::EPSILON);
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "progress update never observed"
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        observed_tx.send(()).expect("job is waiting");
        handle.outcome().await.expect("job completes");
    }
}
