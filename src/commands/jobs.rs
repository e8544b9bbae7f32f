//! `deckhand jobs` — list and explain declared jobs.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use deckhand_core::AppResult;
use deckhand_hooks::Scope;
use deckhand_jobs::Engine;

use crate::output::{self, OutputFormat};

/// Arguments for job commands
#[derive(Debug, Args)]
pub struct JobsArgs {
    /// Jobs subcommand
    #[command(subcommand)]
    pub command: JobsCommand,
}

/// Jobs subcommands
#[derive(Debug, Subcommand)]
pub enum JobsCommand {
    /// List declared jobs
    List,
    /// Show the tasks a job would run, without running them
    Explain {
        /// Only show tasks declared for this scope
        #[arg(short, long)]
        limit: Option<String>,
        /// Job to explain
        job: String,
        /// Extra arguments passed to every task
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct JobRow {
    #[tabled(rename = "Job")]
    name: String,
    #[tabled(rename = "Description")]
    help: String,
}

#[derive(Debug, Serialize, Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    step: usize,
    #[tabled(rename = "Job")]
    job: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Command")]
    command: String,
}

/// Execute job commands
pub fn execute(args: &JobsArgs, engine: &Engine, format: OutputFormat) -> AppResult<()> {
    match &args.command {
        JobsCommand::List => {
            let rows: Vec<JobRow> = engine
                .catalog()
                .list_jobs()?
                .into_iter()
                .map(|job| JobRow {
                    name: job.name,
                    help: job.help,
                })
                .collect();
            output::print_list(&rows, format);
        }
        JobsCommand::Explain { limit, job, args } => {
            let scope = limit.as_deref().map(Scope::from_limit);
            let rows: Vec<TaskRow> = engine
                .executor(engine.config().runner.backend)?
                .explain(job, scope.as_ref(), args)?
                .into_iter()
                .enumerate()
                .map(|(index, task)| TaskRow {
                    step: index + 1,
                    job: task.job,
                    service: task.service,
                    command: task.command,
                })
                .collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}
