//! CLI command definitions and dispatch.

pub mod config;
pub mod do_job;
pub mod jobs;
pub mod plugins;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use deckhand_core::AppResult;
use deckhand_jobs::{Engine, JobSummary};

use crate::output::OutputFormat;

/// deckhand — run declared jobs against local or cluster deployments
#[derive(Debug, Parser)]
#[command(name = "deckhand", version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a job and its prerequisites
    Do(do_job::DoArgs),
    /// Inspect declared jobs
    Jobs(jobs::JobsArgs),
    /// Inspect installed plugins
    Plugins(plugins::PluginsArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Parses process arguments, listing the declared jobs in `do --help`.
    pub fn parse_with_jobs(jobs: &[JobSummary]) -> Self {
        let command = Self::command().mut_subcommand("do", |sub| sub.after_help(jobs_help(jobs)));
        let matches = command.get_matches();
        Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    /// Execute the CLI command
    pub async fn execute(&self, engine: &Engine, cancel: &CancellationToken) -> AppResult<()> {
        match &self.command {
            Commands::Do(args) => do_job::execute(args, engine, cancel).await,
            Commands::Jobs(args) => jobs::execute(args, engine, self.format),
            Commands::Plugins(args) => plugins::execute(args, engine, self.format),
            Commands::Config(args) => config::execute(args, engine, self.format),
        }
    }
}

/// Lists declared jobs for the help text. A failing declaration is logged
/// and leaves the list empty, so `--help` still works.
pub fn declared_jobs(engine: &Engine) -> Vec<JobSummary> {
    engine.catalog().list_jobs().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to list declared jobs");
        Vec::new()
    })
}

fn jobs_help(jobs: &[JobSummary]) -> String {
    if jobs.is_empty() {
        return "No jobs are declared.".to_string();
    }
    let width = jobs.iter().map(|job| job.name.len()).max().unwrap_or(0);
    let mut help = String::from("Jobs:\n");
    for job in jobs {
        help.push_str(&format!("  {:<width$}  {}\n", job.name, job.help));
    }
    help
}
