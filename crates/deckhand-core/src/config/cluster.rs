//! Cluster scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for submitting tasks as cluster jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Namespace that jobs are submitted to and polled in.
    pub namespace: String,
    /// Control-plane client binary.
    pub kubectl: String,
    /// Interval in seconds between polls of the control plane.
    pub poll_interval_seconds: u64,
    /// Upper bound on polls per wait loop. Unset means wait forever.
    pub max_polls: Option<u32>,
    /// Retry count written into each submitted job.
    pub backoff_limit: u32,
    /// Retention window in seconds for finished jobs.
    pub ttl_seconds_after_finished: u64,
    /// Template path of the multi-document job manifest.
    pub manifest_template: Vec<String>,
    /// Where the patched manifest is written, relative to the project root.
    pub manifest_output: String,
}

impl ClusterConfig {
    /// Returns the poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            kubectl: "kubectl".to_string(),
            poll_interval_seconds: 5,
            max_polls: None,
            backoff_limit: 1,
            ttl_seconds_after_finished: 3600,
            manifest_template: vec!["k8s".to_string(), "jobs.yml".to_string()],
            manifest_output: "k8s/jobs.patched.yml".to_string(),
        }
    }
}
