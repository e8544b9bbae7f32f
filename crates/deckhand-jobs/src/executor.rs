//! Job executor — resolves a job and drives its tasks through a runner.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use deckhand_core::config::UnknownJobPolicy;
use deckhand_core::error::AppError;
use deckhand_core::AppResult;
use deckhand_hooks::Scope;

use crate::backend::JobRunner;
use crate::catalog::JobCatalog;
use crate::render::{task_command, TaskRenderer};
use crate::resolver::JobResolver;

/// A resolved task with its final command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplainedTask {
    /// Job the task belongs to.
    pub job: String,
    /// Service that runs the task.
    pub service: String,
    /// Shell command handed to the backend.
    pub command: String,
}

/// Runs jobs one task at a time.
#[derive(Debug, Clone)]
pub struct JobExecutor {
    catalog: JobCatalog,
    renderer: Arc<dyn TaskRenderer>,
    runner: Arc<dyn JobRunner>,
    policy: UnknownJobPolicy,
}

impl JobExecutor {
    /// Create a new job executor
    pub fn new(
        catalog: JobCatalog,
        renderer: Arc<dyn TaskRenderer>,
        runner: Arc<dyn JobRunner>,
        policy: UnknownJobPolicy,
    ) -> Self {
        Self {
            catalog,
            renderer,
            runner,
            policy,
        }
    }

    /// Returns the backend runner.
    pub fn runner(&self) -> &Arc<dyn JobRunner> {
        &self.runner
    }

    /// Resolves and renders a job without running anything.
    pub fn explain(
        &self,
        job: &str,
        scope: Option<&Scope>,
        extra_args: &[String],
    ) -> AppResult<Vec<ExplainedTask>> {
        JobResolver::new(&self.catalog, self.policy)
            .resolve(job, scope)?
            .into_iter()
            .map(|task| {
                let command = task_command(self.renderer.as_ref(), &task.spec, extra_args)?;
                Ok(ExplainedTask {
                    job: task.job,
                    service: task.service,
                    command,
                })
            })
            .collect()
    }

    /// Runs `job` and its prerequisites.
    ///
    /// Every command is rendered before the first task starts. The first
    /// task that fails or exits non-zero aborts the remaining ones.
    pub async fn run_job(
        &self,
        job: &str,
        scope: Option<&Scope>,
        extra_args: &[String],
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        let plan = self.explain(job, scope, extra_args)?;
        let total = plan.len();

        info!(
            job = %job,
            scope = %scope.map(ToString::to_string).unwrap_or_default(),
            backend = %self.runner.name(),
            tasks = total,
            "Running job"
        );

        for (index, task) in plan.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(AppError::cancelled(format!(
                    "Job '{job}' cancelled before task {}/{total}",
                    index + 1
                )));
            }

            info!(
                job = %task.job,
                service = %task.service,
                "Running task {}/{total}",
                index + 1
            );

            let code = self
                .runner
                .run_task(&task.service, &task.command, cancel)
                .await?;

            if code != 0 {
                error!(job = %task.job, service = %task.service, code, "Task failed");
                return Err(AppError::backend_execution(format!(
                    "Task of job '{}' in service '{}' exited with code {code}",
                    task.job, task.service
                )));
            }
        }

        info!(job = %job, "Job completed");
        Ok(())
    }
}
