//! Configuration module for crosstalk
//!
//! Handles loading and managing application settings from TOML files.

mod settings;

pub use settings::{
    AlignmentSettings, ComputeSettings, DiarizationSettings, GeneralSettings, QueueSettings,
    RetrySettings, Settings,
};
