//! Backend selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Execution substrate used to run tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Local multi-container runtime.
    #[default]
    Local,
    /// Cluster scheduler.
    Cluster,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Cluster => write!(f, "cluster"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "cluster" | "k8s" => Ok(Self::Cluster),
            other => Err(AppError::validation(format!(
                "Unknown backend '{other}'. Valid values: local, cluster"
            ))),
        }
    }
}

/// Runner settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Default backend when none is given on the command line.
    pub backend: BackendKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend() {
        assert_eq!("local".parse::<BackendKind>().unwrap(), BackendKind::Local);
        assert_eq!("k8s".parse::<BackendKind>().unwrap(), BackendKind::Cluster);
        assert!("swarm".parse::<BackendKind>().is_err());
    }
}
