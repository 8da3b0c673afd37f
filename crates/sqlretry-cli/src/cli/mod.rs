//! CLI for the sqlretry database retry policy.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sqlretry_core::config;

use commands::{run_probe, run_show_config};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sqlretry")]
#[command(about = "sqlretry: timeout-bounded retries for database calls", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run `SELECT 1` against a database through the retry policy.
    Probe {
        /// Database URL (defaults to the config file, then `sqlite::memory:`).
        #[arg(long)]
        url: Option<String>,
        /// Override the retry timeout, in seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<f64>,
    },

    /// Show the config file path and the effective retry settings.
    Config,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Probe { url, timeout } => run_probe(&cfg, url.as_deref(), timeout)?,
            CliCommand::Config => run_show_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
