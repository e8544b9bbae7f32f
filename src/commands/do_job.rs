//! `deckhand do` — run a job.

use clap::Args;
use tokio_util::sync::CancellationToken;

use deckhand_core::config::BackendKind;
use deckhand_core::AppResult;
use deckhand_hooks::Scope;
use deckhand_jobs::Engine;

use crate::output;

/// Arguments for `do`
#[derive(Debug, Args)]
pub struct DoArgs {
    /// Backend to run on (local or cluster). Defaults to `runner.backend`.
    #[arg(short, long)]
    pub backend: Option<BackendKind>,

    /// Only run tasks declared for this scope, e.g. `lms` or `plugin:minio`
    #[arg(short, long)]
    pub limit: Option<String>,

    /// Job to run
    pub job: String,

    /// Extra arguments passed to every task of the job
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Execute `do`
pub async fn execute(args: &DoArgs, engine: &Engine, cancel: &CancellationToken) -> AppResult<()> {
    let backend = args.backend.unwrap_or(engine.config().runner.backend);
    let scope = args.limit.as_deref().map(Scope::from_limit);

    engine
        .executor(backend)?
        .run_job(&args.job, scope.as_ref(), &args.args, cancel)
        .await?;

    output::print_success(&format!("Job '{}' completed", args.job));
    Ok(())
}
