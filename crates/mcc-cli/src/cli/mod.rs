//! CLI for the MCC media conversion client.

mod commands;
mod flash;
mod menu;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mcc_core::config;
use std::path::PathBuf;

use commands::{run_convert, run_fingerprint, run_interactive};

/// Top-level CLI for the MCC media conversion client.
#[derive(Debug, Parser)]
#[command(name = "mcc")]
#[command(about = "MCC: command-line client for a media conversion service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Convert a video URL and fetch the resulting audio file.
    Convert {
        /// Video URL accepted by the conversion service.
        url: String,

        /// Audio quality in kbit/s (server default when omitted).
        #[arg(long)]
        quality: Option<u32>,

        /// Directory the fetched file lands in (default: current directory).
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,
    },

    /// Read URLs from stdin in a prompt loop.
    Interactive,

    /// Print the header fingerprint that would accompany a request.
    Fingerprint,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Convert {
                url,
                quality,
                download_dir,
            } => run_convert(&cfg, &url, quality, download_dir).await?,
            CliCommand::Interactive => run_interactive(&cfg).await?,
            CliCommand::Fingerprint => run_fingerprint(&cfg),
        }

        Ok(())
    }
}
