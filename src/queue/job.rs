//! Job lifecycle records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a submitted job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, waiting for a free slot
    Pending,
    /// Occupying a slot, work in flight
    Running,
    /// Work finished successfully
    Completed,
    /// Work finished with a fatal error
    Failed,
    /// Cancelled by the caller
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Transitions are monotonic; a job never re-enters an earlier state
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match self {
            Self::Pending => matches!(next, Self::Running | Self::Cancelled),
            Self::Running => next.is_terminal(),
            _ => false,
        }
    }
}

/// Caller-visible record for one submitted job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// Caller-assigned identifier
    pub id: String,

    /// Current lifecycle state
    pub status: JobStatus,

    /// Fractional progress (0.0 - 1.0)
    pub progress: f32,

    /// Human-readable stage label
    pub stage: String,

    /// Submission timestamp
    pub created_at: DateTime<Utc>,

    /// When the job left Pending
    pub started_at: Option<DateTime<Utc>>,

    /// When the job reached a terminal state
    pub completed_at: Option<DateTime<Utc>>,

    /// Human-readable failure description, for Failed jobs
    pub error: Option<String>,
}

impl JobRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Pending,
            progress: 0.0,
            stage: "queued".to_string(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_are_monotonic() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Running));
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Cancelled));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Failed));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Cancelled));

        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::Running.can_transition_to(JobStatus::Pending));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Running));
        assert!(!JobStatus::Cancelled.can_transition_to(JobStatus::Running));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Cancelled));
    }

    #[test]
    fn new_record_starts_pending() {
        let record = JobRecord::new("job-1");
        assert_eq!(record.status, JobStatus::Pending);
        assert_eq!(record.progress, 0.0);
        assert_eq!(record.stage, "queued");
        assert!(record.started_at.is_none());
        assert!(record.error.is_none());
    }
}
