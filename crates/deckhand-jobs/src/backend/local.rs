//! Local-runtime backend — one-off containers through docker compose.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use deckhand_core::config::{LocalConfig, ProjectConfig};
use deckhand_core::error::{AppError, ErrorKind};
use deckhand_core::AppResult;

use super::JobRunner;

/// Starts one-off containers and reports their exit code.
#[async_trait]
pub trait ComposeClient: Send + Sync + std::fmt::Debug {
    /// Runs `argv` in a fresh, auto-removed container of `service`.
    async fn execute(&self, service: &str, argv: &[String]) -> AppResult<i32>;
}

/// `docker compose run --rm` wrapper.
#[derive(Debug, Clone)]
pub struct DockerCompose {
    binary: String,
    project_name: String,
    compose_files: Vec<PathBuf>,
}

impl DockerCompose {
    /// Creates a client from local runtime settings. Compose files are
    /// resolved against the project root.
    pub fn from_config(local: &LocalConfig, project: &ProjectConfig) -> Self {
        let root = project.root_path();
        Self {
            binary: local.binary.clone(),
            project_name: local.project_name.clone(),
            compose_files: local.compose_files.iter().map(|f| root.join(f)).collect(),
        }
    }

    /// Returns the full argument list passed to the binary.
    ///
    /// Compose files missing from disk are left out, so optional override
    /// files may be listed in configuration.
    pub fn command_args(&self, service: &str, argv: &[String], tty: bool) -> Vec<String> {
        let mut args = vec!["compose".to_string()];
        for file in &self.compose_files {
            if !file.exists() {
                debug!(file = %file.display(), "Skipping missing compose file");
                continue;
            }
            args.push("-f".to_string());
            args.push(file.display().to_string());
        }
        args.extend([
            "--project-name".to_string(),
            self.project_name.clone(),
            "run".to_string(),
            "--rm".to_string(),
        ]);
        if !tty {
            args.push("-T".to_string());
        }
        args.push(service.to_string());
        args.extend(argv.iter().cloned());
        args
    }
}

#[async_trait]
impl ComposeClient for DockerCompose {
    async fn execute(&self, service: &str, argv: &[String]) -> AppResult<i32> {
        let args = self.command_args(service, argv, std::io::stdin().is_terminal());
        debug!(binary = %self.binary, args = ?args, "Running compose command");

        let status = Command::new(&self.binary)
            .args(&args)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Io,
                    format!("Failed to start '{}'", self.binary),
                    e,
                )
            })?;

        status.code().ok_or_else(|| {
            AppError::backend_execution(format!(
                "Container for service '{service}' was terminated by a signal"
            ))
        })
    }
}

/// Runs tasks in one-off `<service>-job` containers.
#[derive(Debug, Clone)]
pub struct LocalJobRunner {
    client: Arc<dyn ComposeClient>,
}

impl LocalJobRunner {
    /// Creates a runner over a compose client.
    pub fn new(client: Arc<dyn ComposeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobRunner for LocalJobRunner {
    fn name(&self) -> &str {
        "local"
    }

    async fn run_task(
        &self,
        service: &str,
        command: &str,
        cancel: &CancellationToken,
    ) -> AppResult<i32> {
        let container = format!("{service}-job");
        let argv = [
            "sh".to_string(),
            "-e".to_string(),
            "-c".to_string(),
            command.to_string(),
        ];
        info!(service = %container, "Running task in local container");

        tokio::select! {
            _ = cancel.cancelled() => Err(AppError::cancelled(format!(
                "Task in service '{service}' was cancelled"
            ))),
            code = self.client.execute(&container, &argv) => code,
        }
    }
}
