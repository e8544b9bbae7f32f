//! Cluster backend — exclusivity wait, manifest submission and polling to a
//! terminal state.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use deckhand_core::config::{ClusterConfig, ProjectConfig};
use deckhand_core::error::AppError;
use deckhand_core::AppResult;

use super::kubectl::ClusterClient;
use super::manifest::{self, JobPatch, NAME_LABEL};
use super::JobRunner;
use crate::render::TaskRenderer;

/// Lifecycle of one task submitted to the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterTaskState {
    /// Nothing has happened yet.
    Idle,
    /// Waiting for other jobs in the namespace to finish.
    WaitingForExclusivity,
    /// Manifest applied; the job is not reported active yet.
    Submitted,
    /// The job has running pods.
    Active,
    /// The job completed successfully.
    Succeeded,
    /// The job failed.
    Failed,
}

impl fmt::Display for ClusterTaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::WaitingForExclusivity => write!(f, "waiting_for_exclusivity"),
            Self::Submitted => write!(f, "submitted"),
            Self::Active => write!(f, "active"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Polling cadence shared by both waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between two polls.
    pub interval: Duration,
    /// Maximum number of polls per wait. `None` waits forever.
    pub max_polls: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_polls: None,
        }
    }
}

/// Everything the cluster runner reads from configuration.
#[derive(Debug, Clone)]
pub struct ClusterSettings {
    pub namespace: String,
    pub poll: PollSettings,
    pub backoff_limit: u32,
    pub ttl_seconds_after_finished: u64,
    /// Template path of the multi-document job manifest.
    pub manifest_template: Vec<String>,
    /// Where the patched manifest is written before it is applied.
    pub manifest_output: PathBuf,
}

impl ClusterSettings {
    /// Builds settings from the cluster and project sections.
    ///
    /// Fails when the patched manifest would overwrite its own template,
    /// since every submission rewrites the output file.
    pub fn from_config(cluster: &ClusterConfig, project: &ProjectConfig) -> AppResult<Self> {
        let root = project.root_path();
        let template: PathBuf = cluster.manifest_template.iter().collect();
        let output = root.join(&cluster.manifest_output);
        if output == root.join(&template) {
            return Err(AppError::configuration(format!(
                "cluster.manifest_output '{}' must differ from cluster.manifest_template '{}'",
                cluster.manifest_output,
                template.display()
            )));
        }

        Ok(Self {
            namespace: cluster.namespace.clone(),
            poll: PollSettings {
                interval: cluster.poll_interval(),
                max_polls: cluster.max_polls,
            },
            backoff_limit: cluster.backoff_limit,
            ttl_seconds_after_finished: cluster.ttl_seconds_after_finished,
            manifest_template: cluster.manifest_template.clone(),
            manifest_output: output,
        })
    }
}

/// Runs each task as a uniquely named cluster job, one at a time per
/// namespace.
///
/// Exclusivity is advisory: the runner waits until no job is active, then
/// submits. Two invocations polling at the same moment can both proceed.
#[derive(Debug, Clone)]
pub struct ClusterJobRunner {
    client: Arc<dyn ClusterClient>,
    renderer: Arc<dyn TaskRenderer>,
    settings: ClusterSettings,
}

impl ClusterJobRunner {
    /// Creates a runner.
    pub fn new(
        client: Arc<dyn ClusterClient>,
        renderer: Arc<dyn TaskRenderer>,
        settings: ClusterSettings,
    ) -> Self {
        Self {
            client,
            renderer,
            settings,
        }
    }

    fn transition(&self, state: &mut ClusterTaskState, next: ClusterTaskState, job: &str) {
        if *state != next {
            info!(job = %job, from = %state, to = %next, "Cluster task state changed");
            *state = next;
        }
    }

    /// Sleeps one interval, or fails once the wait is cancelled or has used
    /// up its polls.
    async fn pause(&self, polls: &mut u32, what: &str, cancel: &CancellationToken) -> AppResult<()> {
        *polls += 1;
        if self.settings.poll.max_polls.is_some_and(|max| *polls >= max) {
            return Err(AppError::timeout(format!(
                "Gave up {what} after {polls} polls"
            )));
        }

        tokio::select! {
            _ = cancel.cancelled() => Err(AppError::cancelled(format!("Cancelled while {what}"))),
            _ = time::sleep(self.settings.poll.interval) => Ok(()),
        }
    }

    async fn wait_for_exclusivity(&self, cancel: &CancellationToken) -> AppResult<()> {
        let mut polls = 0;
        loop {
            let active = self.client.list_active_jobs(&self.settings.namespace).await?;
            if active.is_empty() {
                return Ok(());
            }
            info!(
                namespace = %self.settings.namespace,
                blocking = ?active,
                "Waiting for active jobs to terminate"
            );
            self.pause(&mut polls, "waiting for active jobs", cancel).await?;
        }
    }

    async fn submit(&self, service: &str, job_name: &str, command: &str) -> AppResult<()> {
        let source = self.renderer.render(&self.settings.manifest_template)?;
        let patched = manifest::patch_job_manifest(
            &source,
            service,
            &JobPatch {
                job_name,
                command,
                backoff_limit: self.settings.backoff_limit,
                ttl_seconds_after_finished: self.settings.ttl_seconds_after_finished,
            },
        )?;

        let output = &self.settings.manifest_output;
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, patched).await?;
        debug!(path = %output.display(), "Patched job manifest written");

        let selector = format!("{NAME_LABEL}={job_name}");
        self.client
            .apply_manifest(&self.settings.namespace, &selector, output)
            .await
    }

    async fn wait_for_completion(
        &self,
        job_name: &str,
        state: &mut ClusterTaskState,
        cancel: &CancellationToken,
    ) -> AppResult<i32> {
        let mut polls = 0;
        loop {
            let status = self
                .client
                .job_status(&self.settings.namespace, job_name)
                .await?;

            match status {
                Some(status) if status.active => {
                    self.transition(state, ClusterTaskState::Active, job_name);
                }
                Some(status) if status.succeeded => {
                    self.transition(state, ClusterTaskState::Succeeded, job_name);
                    return Ok(0);
                }
                Some(status) if status.failed => {
                    self.transition(state, ClusterTaskState::Failed, job_name);
                    return Err(AppError::backend_execution(format!(
                        "Task {job_name} failed. View the task logs with: \
                         kubectl logs --namespace={} job/{job_name}",
                        self.settings.namespace
                    )));
                }
                Some(_) => debug!(job = %job_name, "Job has not started yet"),
                None => warn!(job = %job_name, "Submitted job not found yet"),
            }

            self.pause(&mut polls, "waiting for job completion", cancel)
                .await?;
        }
    }
}

#[async_trait]
impl JobRunner for ClusterJobRunner {
    fn name(&self) -> &str {
        "cluster"
    }

    async fn run_task(
        &self,
        service: &str,
        command: &str,
        cancel: &CancellationToken,
    ) -> AppResult<i32> {
        let job_name = format!("{service}-job-{}", Utc::now().format("%Y%m%d%H%M%S"));
        let mut state = ClusterTaskState::Idle;

        self.transition(&mut state, ClusterTaskState::WaitingForExclusivity, &job_name);
        self.wait_for_exclusivity(cancel).await?;

        self.submit(service, &job_name, command).await?;
        self.transition(&mut state, ClusterTaskState::Submitted, &job_name);

        self.wait_for_completion(&job_name, &mut state, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, VecDeque};
    use std::path::Path;
    use std::sync::Mutex;

    use deckhand_core::ErrorKind;
    use tokio::time::Instant;

    use super::*;
    use crate::backend::kubectl::ClusterJobStatus;
    use crate::render::EnvRenderer;

    const MANIFESTS: &str = "\
apiVersion: batch/v1
kind: Job
metadata:
  name: lms-job
spec:
  template:
    spec:
      containers:
        - name: lms
          image: openedx:latest
";

    #[derive(Debug)]
    struct StaticRenderer;

    impl TaskRenderer for StaticRenderer {
        fn render(&self, _path: &[String]) -> AppResult<String> {
            Ok(MANIFESTS.to_string())
        }
    }

    /// Replays scripted answers; the last answer repeats.
    #[derive(Debug, Default)]
    struct ScriptedCluster {
        active: Mutex<VecDeque<BTreeSet<String>>>,
        statuses: Mutex<VecDeque<Option<ClusterJobStatus>>>,
        applied: Mutex<Vec<(String, Instant)>>,
    }

    impl ScriptedCluster {
        fn next<T: Clone + Default>(queue: &Mutex<VecDeque<T>>) -> T {
            let mut queue = queue.lock().unwrap();
            if queue.len() > 1 {
                queue.pop_front().unwrap_or_default()
            } else {
                queue.front().cloned().unwrap_or_default()
            }
        }
    }

    #[async_trait]
    impl ClusterClient for ScriptedCluster {
        async fn list_active_jobs(&self, _namespace: &str) -> AppResult<BTreeSet<String>> {
            Ok(Self::next(&self.active))
        }

        async fn job_status(
            &self,
            _namespace: &str,
            _name: &str,
        ) -> AppResult<Option<ClusterJobStatus>> {
            Ok(Self::next(&self.statuses))
        }

        async fn apply_manifest(
            &self,
            _namespace: &str,
            selector: &str,
            _manifest: &Path,
        ) -> AppResult<()> {
            self.applied
                .lock()
                .unwrap()
                .push((selector.to_string(), Instant::now()));
            Ok(())
        }
    }

    fn status(active: bool, succeeded: bool, failed: bool) -> Option<ClusterJobStatus> {
        Some(ClusterJobStatus {
            active,
            succeeded,
            failed,
        })
    }

    fn runner(cluster: Arc<ScriptedCluster>, output: &Path, max_polls: Option<u32>) -> ClusterJobRunner {
        ClusterJobRunner::new(
            cluster,
            Arc::new(StaticRenderer),
            ClusterSettings {
                namespace: "openedx".to_string(),
                poll: PollSettings {
                    interval: Duration::from_secs(5),
                    max_polls,
                },
                backoff_limit: 1,
                ttl_seconds_after_finished: 3600,
                manifest_template: vec!["k8s".to_string(), "jobs.yml".to_string()],
                manifest_output: output.join("k8s/jobs.patched.yml"),
            },
        )
    }

    fn busy() -> BTreeSet<String> {
        BTreeSet::from(["cms-job-20240101000000".to_string()])
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_two_intervals_for_exclusivity() {
        let dir = tempfile::tempdir().unwrap();
        let cluster = Arc::new(ScriptedCluster::default());
        *cluster.active.lock().unwrap() = VecDeque::from([busy(), busy(), BTreeSet::new()]);
        *cluster.statuses.lock().unwrap() = VecDeque::from([status(false, true, false)]);

        let start = Instant::now();
        let code = runner(cluster.clone(), dir.path(), None)
            .run_task("lms", "echo hello", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(code, 0);
        let applied = cluster.applied.lock().unwrap();
        assert_eq!(applied.len(), 1);
        assert!(applied[0].0.starts_with("app.kubernetes.io/name=lms-job-"));
        assert_eq!(applied[0].1 - start, Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_active() {
        let dir = tempfile::tempdir().unwrap();
        let cluster = Arc::new(ScriptedCluster::default());
        *cluster.statuses.lock().unwrap() = VecDeque::from([
            None,
            status(true, false, false),
            status(false, true, false),
        ]);

        let code = runner(cluster, dir.path(), None)
            .run_task("lms", "echo hello", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(code, 0);

        let written = std::fs::read_to_string(dir.path().join("k8s/jobs.patched.yml")).unwrap();
        assert!(written.contains("echo hello"));
        assert!(written.contains("ttlSecondsAfterFinished: 3600"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let cluster = Arc::new(ScriptedCluster::default());
        *cluster.statuses.lock().unwrap() =
            VecDeque::from([status(true, false, false), status(false, false, true)]);

        let err = runner(cluster, dir.path(), None)
            .run_task("lms", "exit 1", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::BackendExecution));
        assert!(err.message.contains("lms-job-"));
        assert!(err.message.contains("View the task logs"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_wait_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let cluster = Arc::new(ScriptedCluster::default());
        *cluster.active.lock().unwrap() = VecDeque::from([busy()]);

        let err = runner(cluster.clone(), dir.path(), Some(3))
            .run_task("lms", "true", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Timeout));
        assert!(cluster.applied.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_polling() {
        let dir = tempfile::tempdir().unwrap();
        let cluster = Arc::new(ScriptedCluster::default());
        *cluster.active.lock().unwrap() = VecDeque::from([busy()]);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(12)).await;
            trigger.cancel();
        });

        let err = runner(cluster, dir.path(), None)
            .run_task("lms", "true", &cancel)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Cancelled));
    }

    const TWO_SERVICES: &str = "\
apiVersion: batch/v1
kind: Job
metadata:
  name: lms-job
spec:
  template:
    spec:
      containers:
        - name: lms
          image: openedx:latest
---
apiVersion: batch/v1
kind: Job
metadata:
  name: cms-job
spec:
  template:
    spec:
      containers:
        - name: cms
          image: openedx:latest
";

    fn project(root: &Path) -> ProjectConfig {
        ProjectConfig {
            root: root.display().to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_config_survives_consecutive_submissions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("k8s")).unwrap();
        std::fs::write(dir.path().join("k8s/jobs.yml"), TWO_SERVICES).unwrap();

        let cluster = Arc::new(ScriptedCluster::default());
        *cluster.statuses.lock().unwrap() = VecDeque::from([status(false, true, false)]);
        let settings =
            ClusterSettings::from_config(&ClusterConfig::default(), &project(dir.path())).unwrap();
        let runner = ClusterJobRunner::new(
            cluster.clone(),
            Arc::new(EnvRenderer::new(dir.path())),
            settings,
        );

        let cancel = CancellationToken::new();
        assert_eq!(runner.run_task("lms", "echo lms", &cancel).await.unwrap(), 0);
        assert_eq!(runner.run_task("cms", "echo cms", &cancel).await.unwrap(), 0);

        let applied = cluster.applied.lock().unwrap();
        assert_eq!(applied.len(), 2);
        assert!(applied[1].0.starts_with("app.kubernetes.io/name=cms-job-"));

        let template = std::fs::read_to_string(dir.path().join("k8s/jobs.yml")).unwrap();
        assert_eq!(template, TWO_SERVICES);
        let written = std::fs::read_to_string(dir.path().join("k8s/jobs.patched.yml")).unwrap();
        assert!(written.contains("echo cms"));
        assert!(!written.contains("echo lms"));
    }

    #[test]
    fn test_output_overwriting_template_is_rejected() {
        let config = ClusterConfig {
            manifest_output: "k8s/jobs.yml".to_string(),
            ..ClusterConfig::default()
        };

        let err =
            ClusterSettings::from_config(&config, &project(Path::new("/srv/env"))).unwrap_err();
        assert!(err.is(ErrorKind::Configuration));
        assert!(err.message.contains("cluster.manifest_output"));
    }
}
