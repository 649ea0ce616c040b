//! crosstalk - Speaker-attributed transcripts from transcription and diarization output
//!
//! Entry point for the crosstalk CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crosstalk::cli::{Cli, Commands};
use crosstalk::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => {
            crosstalk::cli::completions::print(shell);
        }
        command => {
            // Load configuration only for runtime commands.
            let settings = Settings::load()?;

            match command {
                Commands::Align {
                    transcript,
                    diarization,
                    format,
                    output,
                    no_merge,
                } => {
                    crosstalk::cli::commands::align_files(
                        &settings,
                        &transcript,
                        &diarization,
                        &format,
                        output,
                        !no_merge,
                    )?;
                }
                Commands::Config(config_cmd) => {
                    crosstalk::cli::commands::config_command(&settings, config_cmd)?;
                }
                Commands::Completions { .. } => unreachable!(),
            }
        }
    }

    Ok(())
}
