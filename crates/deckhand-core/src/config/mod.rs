//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every section falls back to its defaults when absent.

pub mod cluster;
pub mod jobs;
pub mod local;
pub mod logging;
pub mod plugin;
pub mod project;
pub mod runner;

use serde::{Deserialize, Serialize};

pub use self::cluster::ClusterConfig;
pub use self::jobs::{JobsConfig, UnknownJobPolicy};
pub use self::local::LocalConfig;
pub use self::logging::LoggingConfig;
pub use self::plugin::{DeclaredPlugin, PluginConfig};
pub use self::project::ProjectConfig;
pub use self::runner::{BackendKind, RunnerConfig};

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "DECKHAND";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Project environment settings.
    pub project: ProjectConfig,
    /// Job resolution settings.
    pub jobs: JobsConfig,
    /// Backend selection.
    pub runner: RunnerConfig,
    /// Local multi-container runtime settings.
    pub local: LocalConfig,
    /// Cluster scheduler settings.
    pub cluster: ClusterConfig,
    /// Plugin settings.
    pub plugins: PluginConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the file at `path` with an environment-specific overlay
    /// (`config/<env>.toml`) and environment variables prefixed with
    /// `DECKHAND__`. Missing files are skipped.
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
