//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// crosstalk - Speaker-attributed transcripts from transcription and diarization output
#[derive(Parser, Debug)]
#[command(name = "crosstalk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Align transcription segments with diarization turns
    Align {
        /// Path to the transcription segments JSON file
        #[arg(short, long)]
        transcript: PathBuf,

        /// Path to the diarization turns JSON file
        #[arg(short, long)]
        diarization: PathBuf,

        /// Output format (txt, json, srt)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep adjacent same-speaker segments separate
        #[arg(long)]
        no_merge: bool,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
