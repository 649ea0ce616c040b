//! Job admission module for crosstalk
//!
//! Bounded-concurrency scheduler with per-job lifecycle records and
//! cooperative cancellation.

mod admission;
mod job;

pub use admission::{AdmissionQueue, JobContext, JobHandle};
pub use job::{JobRecord, JobStatus};
