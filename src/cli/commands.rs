//! CLI command implementations

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::alignment::{self, AlignedSegment};
use crate::cli::args::ConfigCommand;
use crate::config::Settings;
use crate::engines::{SpeakerTurn, TimedSegment};

/// Align transcription segments with diarization turns from JSON files
pub fn align_files(
    settings: &Settings,
    transcript: &Path,
    diarization: &Path,
    format: &str,
    output: Option<PathBuf>,
    merge: bool,
) -> Result<()> {
    let segments: Vec<TimedSegment> = read_json(transcript)
        .with_context(|| format!("Failed to read segments from {}", transcript.display()))?;
    let turns: Vec<SpeakerTurn> = read_json(diarization)
        .with_context(|| format!("Failed to read turns from {}", diarization.display()))?;

    let aligned = alignment::align(&segments, &turns, &settings.alignment);
    let aligned = alignment::interpolate(aligned, settings.alignment.interpolation_max_gap_secs);
    let aligned = if merge {
        alignment::merge_adjacent(aligned, settings.alignment.merge_max_gap_secs)
    } else {
        aligned
    };

    let unknown = aligned.iter().filter(|s| s.is_unknown()).count();
    let interpolated = aligned.iter().filter(|s| s.interpolated).count();

    let content = match format {
        "txt" => render_as_txt(&aligned),
        "json" => render_as_json(&aligned)?,
        "srt" => render_as_srt(&aligned),
        _ => anyhow::bail!("Unsupported format: {}. Supported: txt, json, srt", format),
    };

    if let Some(path) = output {
        std::fs::write(&path, content)?;
        println!("Aligned transcript written to: {}", path.display());
    } else {
        print!("{}", content);
    }

    eprintln!(
        "Aligned {} segments against {} turns ({} unknown, {} interpolated)",
        aligned.len(),
        turns.len(),
        unknown,
        interpolated
    );

    Ok(())
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(settings)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn render_as_txt(segments: &[AlignedSegment]) -> String {
    let mut output = String::new();

    for segment in segments {
        let timestamp = format_timestamp(segment.start);
        output.push_str(&format!(
            "[{}] {}: {}\n",
            timestamp, segment.speaker, segment.text
        ));
    }

    output
}

fn render_as_json(segments: &[AlignedSegment]) -> Result<String> {
    Ok(serde_json::to_string_pretty(segments)?)
}

fn render_as_srt(segments: &[AlignedSegment]) -> String {
    let mut output = String::new();

    for (i, segment) in segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_timestamp(segment.start),
            format_srt_timestamp(segment.end)
        ));
        output.push_str(&format!("{}: {}\n\n", segment.speaker, segment.text));
    }

    output
}

fn format_timestamp(secs: f64) -> String {
    let total_secs = secs as u64;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

fn format_srt_timestamp(secs: f64) -> String {
    let total_ms = (secs * 1000.0) as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::TimedSegment;

    fn sample() -> Vec<AlignedSegment> {
        vec![
            AlignedSegment::attributed(&TimedSegment::new(0.0, 2.5, "hello"), "A", 0.9),
            AlignedSegment::unknown(&TimedSegment::new(3.0, 4.0, "mm-hm")),
        ]
    }

    #[test]
    fn txt_render_includes_speaker_labels() {
        let text = render_as_txt(&sample());
        assert!(text.contains("[00:00] A: hello"));
        assert!(text.contains("UNKNOWN: mm-hm"));
    }

    #[test]
    fn srt_render_numbers_and_timestamps() {
        let srt = render_as_srt(&sample());
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:02,500\n"));
        assert!(srt.contains("2\n00:00:03,000 --> 00:00:04,000\n"));
    }

    #[test]
    fn format_timestamp_rolls_into_hours() {
        assert_eq!(format_timestamp(59.9), "00:59");
        assert_eq!(format_timestamp(3725.0), "01:02:05");
    }
}
