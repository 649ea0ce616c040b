//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Interval alignment settings
    #[serde(default)]
    pub alignment: AlignmentSettings,

    /// Accelerated/fallback compute settings
    #[serde(default)]
    pub compute: ComputeSettings,

    /// Diarization engine settings
    #[serde(default)]
    pub diarization: DiarizationSettings,

    /// Retry and circuit-breaker settings
    #[serde(default)]
    pub retry: RetrySettings,

    /// Job admission settings
    #[serde(default)]
    pub queue: QueueSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentSettings {
    /// Minimum fraction of a segment a turn must cover for a direct match
    #[serde(default = "default_overlap_threshold")]
    pub overlap_threshold: f64,

    /// Fall back to the nearest turn when no turn meets the threshold
    #[serde(default = "default_true")]
    pub use_nearest_fallback: bool,

    /// Maximum edge distance for the nearest-turn fallback, in seconds
    #[serde(default = "default_nearest_fallback_max_distance")]
    pub nearest_fallback_max_distance_secs: f64,

    /// Maximum neighbor gap bridged by UNKNOWN interpolation, in seconds
    #[serde(default = "default_interpolation_max_gap")]
    pub interpolation_max_gap_secs: f64,

    /// Maximum gap merged between adjacent same-speaker segments, in seconds
    #[serde(default = "default_merge_max_gap")]
    pub merge_max_gap_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeSettings {
    /// Whether accelerated compute is configured at all
    #[serde(default = "default_true")]
    pub use_accelerated: bool,

    /// Retry a failed accelerated attempt once on the fallback path
    #[serde(default = "default_true")]
    pub allow_fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiarizationSettings {
    /// Expected number of speakers (0 = let the engine auto-detect)
    #[serde(default)]
    pub num_speakers: usize,
}

impl DiarizationSettings {
    /// Speaker count as the engine interface expects it
    pub fn num_speakers_hint(&self) -> Option<usize> {
        if self.num_speakers == 0 {
            None
        } else {
            Some(self.num_speakers)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries after the first attempt for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay, doubled per attempt, in milliseconds
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,

    /// Deadline for each individual attempt, in seconds
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    /// Consecutive failures before the circuit opens
    #[serde(default = "default_circuit_failure_threshold")]
    pub circuit_failure_threshold: u32,

    /// Cool-down before an open circuit admits a probe, in seconds
    #[serde(default = "default_circuit_cooldown_secs")]
    pub circuit_cooldown_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSettings {
    /// Hard ceiling on simultaneously running jobs
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_overlap_threshold() -> f64 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_nearest_fallback_max_distance() -> f64 {
    5.0
}

fn default_interpolation_max_gap() -> f64 {
    3.0
}

fn default_merge_max_gap() -> f64 {
    0.5
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_backoff_ms() -> u64 {
    500
}

fn default_attempt_timeout_secs() -> u64 {
    300
}

fn default_circuit_failure_threshold() -> u32 {
    5
}

fn default_circuit_cooldown_secs() -> u64 {
    30
}

fn default_max_concurrent_jobs() -> usize {
    3
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for AlignmentSettings {
    fn default() -> Self {
        Self {
            overlap_threshold: default_overlap_threshold(),
            use_nearest_fallback: true,
            nearest_fallback_max_distance_secs: default_nearest_fallback_max_distance(),
            interpolation_max_gap_secs: default_interpolation_max_gap(),
            merge_max_gap_secs: default_merge_max_gap(),
        }
    }
}

impl Default for ComputeSettings {
    fn default() -> Self {
        Self {
            use_accelerated: true,
            allow_fallback: true,
        }
    }
}

impl Default for DiarizationSettings {
    fn default() -> Self {
        Self { num_speakers: 0 }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_backoff_ms: default_base_backoff_ms(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            circuit_failure_threshold: default_circuit_failure_threshold(),
            circuit_cooldown_secs: default_circuit_cooldown_secs(),
        }
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            alignment: AlignmentSettings::default(),
            compute: ComputeSettings::default(),
            diarization: DiarizationSettings::default(),
            retry: RetrySettings::default(),
            queue: QueueSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("No config file found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        Ok(settings)
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "crosstalk", "crosstalk")
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &PathBuf) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.alignment.overlap_threshold, 0.3);
        assert!(settings.alignment.use_nearest_fallback);
        assert_eq!(settings.alignment.nearest_fallback_max_distance_secs, 5.0);
        assert_eq!(settings.alignment.interpolation_max_gap_secs, 3.0);
        assert_eq!(settings.queue.max_concurrent_jobs, 3);
        assert_eq!(settings.retry.circuit_failure_threshold, 5);
        assert_eq!(settings.retry.circuit_cooldown_secs, 30);
    }

    #[test]
    fn zero_speakers_means_auto_detect() {
        let settings = DiarizationSettings::default();
        assert_eq!(settings.num_speakers_hint(), None);

        let fixed = DiarizationSettings { num_speakers: 2 };
        assert_eq!(fixed.num_speakers_hint(), Some(2));
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let settings: Settings =
            toml::from_str("[alignment]\noverlap_threshold = 0.5\n").expect("parse partial toml");
        assert_eq!(settings.alignment.overlap_threshold, 0.5);
        assert_eq!(settings.alignment.interpolation_max_gap_secs, 3.0);
        assert_eq!(settings.queue.max_concurrent_jobs, 3);
    }
}
