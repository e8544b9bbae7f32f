//! Backend job runners — execute one (service, command) pair.

pub mod cluster;
pub mod kubectl;
pub mod local;
pub mod manifest;

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use deckhand_core::config::{AppConfig, BackendKind};
use deckhand_core::AppResult;

pub use cluster::{ClusterJobRunner, ClusterSettings, ClusterTaskState, PollSettings};
pub use kubectl::{ClusterClient, ClusterJobStatus, Kubectl};
pub use local::{ComposeClient, DockerCompose, LocalJobRunner};

use crate::render::TaskRenderer;

/// Runs one task command inside one service's runtime environment.
#[async_trait]
pub trait JobRunner: Send + Sync + std::fmt::Debug {
    /// Returns the backend name used in logs.
    fn name(&self) -> &str;

    /// Runs `command` in `service` and returns its exit code.
    ///
    /// Backends that track a terminal state rather than an exit code return
    /// `0` on success and an error on failure.
    async fn run_task(
        &self,
        service: &str,
        command: &str,
        cancel: &CancellationToken,
    ) -> AppResult<i32>;
}

/// Builds the runner for a backend from configuration.
pub fn build_runner(
    kind: BackendKind,
    config: &AppConfig,
    renderer: Arc<dyn TaskRenderer>,
) -> AppResult<Arc<dyn JobRunner>> {
    let runner: Arc<dyn JobRunner> = match kind {
        BackendKind::Local => {
            let client = DockerCompose::from_config(&config.local, &config.project);
            Arc::new(LocalJobRunner::new(Arc::new(client)))
        }
        BackendKind::Cluster => {
            let client = Kubectl::from_config(&config.cluster);
            let settings = ClusterSettings::from_config(&config.cluster, &config.project)?;
            Arc::new(ClusterJobRunner::new(Arc::new(client), renderer, settings))
        }
    };
    Ok(runner)
}
