//! Plugin system configuration.

use serde::{Deserialize, Serialize};

use crate::types::job::{JobHelptext, JobPrerequisite, JobTask};

/// Plugin system configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Plugins to load at startup, in order.
    pub enabled: Vec<String>,
    /// Data-only plugins declared directly in configuration.
    pub declared: Vec<DeclaredPlugin>,
}

/// A plugin made only of job declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclaredPlugin {
    /// Plugin name; also the scope used by `--limit`.
    pub name: String,
    /// Version string shown by `plugins list`.
    #[serde(default)]
    pub version: String,
    /// Tasks contributed to jobs.
    #[serde(default)]
    pub tasks: Vec<JobTask>,
    /// Prerequisite edges contributed between jobs.
    #[serde(default)]
    pub prerequisites: Vec<JobPrerequisite>,
    /// Job helptexts.
    #[serde(default)]
    pub helptexts: Vec<JobHelptext>,
}
