//! `deckhand config` — configuration management.

use clap::{Args, Subcommand};

use deckhand_core::AppResult;
use deckhand_jobs::Engine;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration
    Show,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, engine: &Engine, format: OutputFormat) -> AppResult<()> {
    match args.command {
        ConfigCommand::Show => output::print_item(engine.config(), format),
    }
    Ok(())
}
