//! Job resolution configuration.

use serde::{Deserialize, Serialize};

/// What to do when a requested job has no declarations at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownJobPolicy {
    /// Fail with a configuration error.
    #[default]
    Error,
    /// Treat the job as an empty no-op.
    Ignore,
}

/// Job resolution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Policy for job names with zero task, prerequisite, or helptext
    /// contributions.
    pub unknown_job: UnknownJobPolicy,
}
