//! Cluster control plane — job listing, status and manifest submission.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use deckhand_core::config::ClusterConfig;
use deckhand_core::error::{AppError, ErrorKind};
use deckhand_core::AppResult;

/// Observed state of a submitted cluster job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterJobStatus {
    /// At least one pod is running.
    pub active: bool,
    /// At least one pod completed successfully.
    pub succeeded: bool,
    /// At least one pod failed.
    pub failed: bool,
}

impl ClusterJobStatus {
    /// Reads the counters of a job's `status` object.
    pub fn from_status(status: &Value) -> Self {
        let positive = |key: &str| status.get(key).and_then(Value::as_u64).unwrap_or(0) > 0;
        Self {
            active: positive("active"),
            succeeded: positive("succeeded"),
            failed: positive("failed"),
        }
    }
}

/// Operations the cluster backend needs from the control plane.
#[async_trait]
pub trait ClusterClient: Send + Sync + std::fmt::Debug {
    /// Names of the jobs with running pods in `namespace`.
    async fn list_active_jobs(&self, namespace: &str) -> AppResult<BTreeSet<String>>;

    /// Status of job `name`, or `None` if the job does not exist.
    async fn job_status(&self, namespace: &str, name: &str) -> AppResult<Option<ClusterJobStatus>>;

    /// Applies the manifest file, limited to objects matching `selector`.
    async fn apply_manifest(&self, namespace: &str, selector: &str, manifest: &Path)
    -> AppResult<()>;
}

/// `kubectl` wrapper.
#[derive(Debug, Clone)]
pub struct Kubectl {
    binary: String,
}

impl Kubectl {
    /// Creates a client from cluster settings.
    pub fn from_config(config: &ClusterConfig) -> Self {
        Self {
            binary: config.kubectl.clone(),
        }
    }

    async fn run(&self, args: &[&str]) -> AppResult<std::process::Output> {
        debug!(binary = %self.binary, args = ?args, "Running kubectl");
        Command::new(&self.binary)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Io,
                    format!("Failed to start '{}'", self.binary),
                    e,
                )
            })
    }

    fn failure(args: &[&str], output: &std::process::Output) -> AppError {
        AppError::backend_execution(format!(
            "kubectl {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        ))
    }
}

/// Extracts the names of jobs with active pods from a `JobList` document.
pub fn active_job_names(list: &Value) -> BTreeSet<String> {
    list.get("items")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|job| {
            job.get("status")
                .map(ClusterJobStatus::from_status)
                .is_some_and(|status| status.active)
        })
        .filter_map(|job| job.pointer("/metadata/name").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl ClusterClient for Kubectl {
    async fn list_active_jobs(&self, namespace: &str) -> AppResult<BTreeSet<String>> {
        let args = ["get", "jobs", "--namespace", namespace, "--output", "json"];
        let output = self.run(&args).await?;
        if !output.status.success() {
            return Err(Self::failure(&args, &output));
        }
        let list: Value = serde_json::from_slice(&output.stdout)?;
        Ok(active_job_names(&list))
    }

    async fn job_status(&self, namespace: &str, name: &str) -> AppResult<Option<ClusterJobStatus>> {
        let args = ["get", "job", name, "--namespace", namespace, "--output", "json"];
        let output = self.run(&args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("NotFound") {
                return Ok(None);
            }
            return Err(Self::failure(&args, &output));
        }
        let job: Value = serde_json::from_slice(&output.stdout)?;
        Ok(Some(
            job.get("status")
                .map(ClusterJobStatus::from_status)
                .unwrap_or_default(),
        ))
    }

    async fn apply_manifest(
        &self,
        namespace: &str,
        selector: &str,
        manifest: &Path,
    ) -> AppResult<()> {
        let manifest = manifest.display().to_string();
        let args = [
            "apply",
            "--namespace",
            namespace,
            "--selector",
            selector,
            "--filename",
            manifest.as_str(),
        ];
        let output = self.run(&args).await?;
        if !output.status.success() {
            return Err(Self::failure(&args, &output));
        }
        Ok(())
    }
}
