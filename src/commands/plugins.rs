//! `deckhand plugins` — inspect plugins.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use deckhand_core::AppResult;
use deckhand_jobs::Engine;

use crate::output::{self, OutputFormat};

/// Arguments for plugin commands
#[derive(Debug, Args)]
pub struct PluginsArgs {
    /// Plugins subcommand
    #[command(subcommand)]
    pub command: PluginsCommand,
}

/// Plugins subcommands
#[derive(Debug, Subcommand)]
pub enum PluginsCommand {
    /// List installed plugins
    List,
}

#[derive(Debug, Serialize, Tabled)]
struct PluginRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Loaded")]
    loaded: bool,
}

/// Execute plugin commands
pub fn execute(args: &PluginsArgs, engine: &Engine, format: OutputFormat) -> AppResult<()> {
    match args.command {
        PluginsCommand::List => {
            let rows: Vec<PluginRow> = engine
                .plugins()
                .list()?
                .into_iter()
                .map(|info| PluginRow {
                    name: info.name,
                    version: info.version,
                    loaded: info.loaded,
                })
                .collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}
