//! Project environment configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Location of the rendered project environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory holding rendered templates (task scripts, manifests).
    pub root: String,
}

impl ProjectConfig {
    /// Returns the environment root as a path.
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: "./env".to_string(),
        }
    }
}
