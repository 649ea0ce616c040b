//! Compute dispatch module for crosstalk
//!
//! Routes blocking engine calls onto the accelerated compute path with
//! automatic fallback to the always-available path.

mod dispatcher;

pub use dispatcher::ComputeDispatcher;
