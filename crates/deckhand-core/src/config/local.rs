//! Local multi-container runtime configuration.

use serde::{Deserialize, Serialize};

/// Settings for running one-off task containers locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Container runtime binary; invoked as `<binary> compose ...`.
    pub binary: String,
    /// Compose project name.
    pub project_name: String,
    /// Compose files, relative to the project root. Missing files are skipped.
    pub compose_files: Vec<String>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            project_name: "deckhand".to_string(),
            compose_files: vec![
                "local/docker-compose.yml".to_string(),
                "local/docker-compose.jobs.yml".to_string(),
            ],
        }
    }
}
