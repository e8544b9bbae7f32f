//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use deckhand_core::AppResult;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a single item in the selected format
pub fn print_item<T: Serialize>(item: &T, format: OutputFormat) {
    match render_item(item, format) {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => print_error(&format!("Failed to render output: {e}")),
    }
}

/// Renders one item. Table output is YAML, which keeps nested sections
/// readable.
fn render_item<T: Serialize>(item: &T, format: OutputFormat) -> AppResult<String> {
    Ok(match format {
        OutputFormat::Table => serde_yaml::to_string(item)?,
        OutputFormat::Json => serde_json::to_string_pretty(item)?,
    })
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}
