//! Shared test helpers for integration tests.

use std::fs;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use deckhand_core::config::AppConfig;
use deckhand_core::AppResult;
use deckhand_jobs::{Engine, JobExecutor, JobRunner};

/// Runner that records every task instead of running it.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingRunner {
    /// Services in the order their tasks ran.
    pub fn services(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(service, _)| service.clone())
            .collect()
    }

    /// Commands in the order they ran.
    pub fn commands(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, command)| command.clone())
            .collect()
    }
}

#[async_trait]
impl JobRunner for RecordingRunner {
    fn name(&self) -> &str {
        "recording"
    }

    async fn run_task(
        &self,
        service: &str,
        command: &str,
        _cancel: &CancellationToken,
    ) -> AppResult<i32> {
        self.calls
            .lock()
            .unwrap()
            .push((service.to_string(), command.to_string()));
        Ok(0)
    }
}

/// Test application context
pub struct TestApp {
    /// Bootstrapped engine
    pub engine: Engine,
    /// Runner shared with every executor built by [`TestApp::executor`]
    pub runner: Arc<RecordingRunner>,
    _root: TempDir,
}

impl TestApp {
    /// Bootstraps an engine from `extra_toml` with a rendered task tree.
    ///
    /// Every core task template renders to `echo <service> <job>`.
    pub fn new(extra_toml: &str) -> Self {
        let root = TempDir::new().expect("Failed to create project root");
        for (service, job) in [
            ("lms", "init"),
            ("lms", "createuser"),
            ("lms", "settheme"),
            ("cms", "init"),
            ("cms", "importdemocourse"),
            ("mysql", "init"),
        ] {
            let dir = root.path().join("tasks").join(service);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(job), format!("echo {service} {job}\n")).unwrap();
        }

        let source = format!(
            "[project]\nroot = {:?}\n\n{extra_toml}",
            root.path().display().to_string()
        );
        let config = AppConfig::from_toml(&source).expect("Failed to parse test config");
        let engine = Engine::bootstrap(config).expect("Failed to bootstrap engine");

        Self {
            engine,
            runner: Arc::new(RecordingRunner::default()),
            _root: root,
        }
    }

    /// Executor that records into [`TestApp::runner`].
    pub fn executor(&self) -> JobExecutor {
        self.engine.executor_with_runner(self.runner.clone())
    }
}

/// Declares a `minio` plugin adding an init task and a prerequisite job.
pub const MINIO_PLUGIN: &str = r#"
[plugins]
enabled = ["minio"]

[[plugins.declared]]
name = "minio"
version = "1.2.0"
tasks = [
  { job = "init", service = "minio", spec = { command = ["mc", "mb", "openedx"] } },
  { job = "pre-init", service = "minio", spec = { command = ["mc", "ready", "local"] } },
]
helptexts = [{ job = "bucket", text = "Create the storage bucket" }]
prerequisites = [{ job = "bucket", prerequisite = "pre-init" }]
"#;
