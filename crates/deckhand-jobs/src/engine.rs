//! Engine bootstrap — wires configuration, registry, plugins and runners.

use std::sync::Arc;

use tracing::info;

use deckhand_core::config::{AppConfig, BackendKind};
use deckhand_core::AppResult;
use deckhand_hooks::{Actions, HookRegistry, Plugin, PluginManager};

use crate::backend::{build_runner, JobRunner};
use crate::catalog::JobCatalog;
use crate::core_jobs;
use crate::declared::DeclaredJobsPlugin;
use crate::executor::JobExecutor;
use crate::render::{EnvRenderer, TaskRenderer};

/// A fully declared application context.
#[derive(Debug)]
pub struct Engine {
    config: AppConfig,
    registry: Arc<HookRegistry>,
    catalog: JobCatalog,
    plugins: PluginManager,
    renderer: Arc<dyn TaskRenderer>,
}

impl Engine {
    /// Bootstraps from configuration alone.
    pub fn bootstrap(config: AppConfig) -> AppResult<Self> {
        Self::bootstrap_with(config, Vec::new())
    }

    /// Bootstraps with additional compiled-in plugins.
    ///
    /// Order: core jobs bind to `core:ready`; declared and extra plugins are
    /// installed; `core:ready` fires; enabled plugins load; `plugins:loaded`
    /// fires.
    pub fn bootstrap_with(config: AppConfig, extra: Vec<Arc<dyn Plugin>>) -> AppResult<Self> {
        let registry = Arc::new(HookRegistry::new());
        core_jobs::register(&registry);

        let plugins = PluginManager::new(registry.clone());
        for declaration in &config.plugins.declared {
            plugins.install(Arc::new(DeclaredJobsPlugin::new(declaration.clone())))?;
        }
        for plugin in extra {
            plugins.install(plugin)?;
        }

        Actions::CORE_READY.fire(&registry, &registry, None)?;
        plugins.load_all(&config.plugins.enabled)?;

        info!(
            hooks = registry.registered_hooks().len(),
            plugins = config.plugins.enabled.len(),
            "Engine ready"
        );

        let renderer: Arc<dyn TaskRenderer> = Arc::new(EnvRenderer::new(config.project.root_path()));
        Ok(Self {
            catalog: JobCatalog::new(registry.clone()),
            config,
            registry,
            plugins,
            renderer,
        })
    }

    /// Replaces the template renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn TaskRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    pub fn catalog(&self) -> &JobCatalog {
        &self.catalog
    }

    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }

    /// Builds an executor for the given backend.
    pub fn executor(&self, backend: BackendKind) -> AppResult<JobExecutor> {
        let runner = build_runner(backend, &self.config, self.renderer.clone())?;
        Ok(self.executor_with_runner(runner))
    }

    /// Builds an executor over an explicit runner.
    pub fn executor_with_runner(&self, runner: Arc<dyn JobRunner>) -> JobExecutor {
        JobExecutor::new(
            self.catalog.clone(),
            self.renderer.clone(),
            runner,
            self.config.jobs.unknown_job,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_declares_core_jobs() {
        let engine = Engine::bootstrap(AppConfig::default()).unwrap();
        assert!(engine.catalog().is_declared("init").unwrap());
        assert!(engine.plugins().installed().unwrap().is_empty());
        assert_eq!(engine.registry().current_scopes().len(), 0);
    }

    #[test]
    fn test_enabling_unknown_plugin_fails() {
        let mut config = AppConfig::default();
        config.plugins.enabled = vec!["missing".to_string()];

        let err = Engine::bootstrap(config).unwrap_err();
        assert!(err.is(deckhand_core::ErrorKind::NotFound));
    }

    #[test]
    fn test_executor_uses_configured_backend() {
        let engine = Engine::bootstrap(AppConfig::default()).unwrap();
        let local = engine.executor(BackendKind::Local).unwrap();
        let cluster = engine.executor(BackendKind::Cluster).unwrap();
        assert_eq!(local.runner().name(), "local");
        assert_eq!(cluster.runner().name(), "cluster");
    }

    #[test]
    fn test_cluster_executor_rejects_self_overwriting_manifest() {
        let mut config = AppConfig::default();
        config.cluster.manifest_output = "k8s/jobs.yml".to_string();
        let engine = Engine::bootstrap(config).unwrap();

        let err = engine.executor(BackendKind::Cluster).unwrap_err();
        assert!(err.is(deckhand_core::ErrorKind::Configuration));
        assert!(engine.executor(BackendKind::Local).is_ok());
    }

    #[test]
    fn test_bootstrap_loads_enabled_declared_plugin() {
        let config = AppConfig::from_toml(
            r#"
            [plugins]
            enabled = ["minio"]

            [[plugins.declared]]
            name = "minio"
            helptexts = [{ job = "bucket", text = "Create the storage bucket" }]
            "#,
        )
        .unwrap();

        let engine = Engine::bootstrap(config).unwrap();
        assert!(engine.plugins().is_loaded("minio").unwrap());
        assert!(engine.catalog().is_declared("bucket").unwrap());
    }
}
