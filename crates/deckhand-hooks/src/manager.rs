//! Plugin manager — install, load and disable plugins through hooks.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use deckhand_core::error::AppError;
use deckhand_core::AppResult;

use crate::hooks::catalog::{Actions, Filters};
use crate::hooks::definitions::Priority;
use crate::hooks::registry::HookRegistry;
use crate::plugin::{Plugin, PluginInfo};
use crate::scope::Scope;

/// Manages the plugin lifecycle on top of a [`HookRegistry`].
///
/// Installed and loaded plugin names are kept in the `plugins:installed` and
/// `plugins:loaded` filters, so other plugins can observe them the same way
/// they observe any other declaration.
#[derive(Debug)]
pub struct PluginManager {
    /// Hook registry shared with the job catalog.
    registry: Arc<HookRegistry>,
    /// Plugin name → instance.
    plugins: DashMap<String, Arc<dyn Plugin>>,
}

impl PluginManager {
    /// Creates a plugin manager bound to a registry.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self {
            registry,
            plugins: DashMap::new(),
        }
    }

    /// Returns the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    /// Makes a plugin available for loading.
    ///
    /// The plugin's `register` is bound to its `plugins:load:<name>` action;
    /// nothing is declared until [`load`](Self::load) fires it.
    pub fn install(&self, plugin: Arc<dyn Plugin>) -> AppResult<()> {
        let name = plugin.name().to_string();
        if self.plugins.contains_key(&name) {
            return Err(AppError::validation(format!(
                "Plugin '{name}' is already installed"
            )));
        }

        Filters::PLUGINS_INSTALLED.add_item(&self.registry, name.clone());

        let target = plugin.clone();
        Actions::load_plugin(&name).add_named(
            &self.registry,
            format!("{name}::register"),
            Priority::DEFAULT,
            move |registry: &Arc<HookRegistry>| target.register(registry),
        );

        info!(plugin = %name, version = %plugin.version(), "Plugin installed");
        self.plugins.insert(name, plugin);
        Ok(())
    }

    /// Loads an installed plugin.
    ///
    /// Loading an already loaded plugin is a no-op. The plugin's name is
    /// added to `plugins:loaded` inside its own scope, so disabling it also
    /// marks it unloaded. If registration fails, everything the plugin
    /// declared so far is retracted.
    pub fn load(&self, name: &str) -> AppResult<()> {
        if !self.plugins.contains_key(name) {
            return Err(AppError::not_found(format!(
                "Plugin '{name}' is not installed"
            )));
        }
        if self.is_loaded(name)? {
            debug!(plugin = %name, "Plugin already loaded");
            return Ok(());
        }

        let result = {
            let _guard = self
                .registry
                .enter([Scope::plugin(name), Scope::app(name)]);
            Actions::load_plugin(name)
                .fire(&self.registry, &self.registry, None)
                .map(|()| Filters::PLUGINS_LOADED.add_item(&self.registry, name.to_string()))
        };

        if let Err(e) = result {
            let retracted = self.disable(name);
            warn!(plugin = %name, retracted, error = %e, "Plugin load failed");
            return Err(e);
        }

        info!(plugin = %name, "Plugin loaded");
        Ok(())
    }

    /// Loads the given plugins in order, then fires `plugins:loaded`.
    pub fn load_all(&self, names: &[String]) -> AppResult<()> {
        for name in names {
            self.load(name)?;
        }
        Actions::PLUGINS_LOADED.fire(&self.registry, &(), None)
    }

    /// Retracts every registration made while the plugin loaded.
    ///
    /// Returns the number of removed callbacks.
    pub fn disable(&self, name: &str) -> usize {
        let removed = self.registry.clear_all(Some(&Scope::plugin(name)));
        info!(plugin = %name, removed, "Plugin disabled");
        removed
    }

    /// Returns installed plugin names in installation order.
    pub fn installed(&self) -> AppResult<Vec<String>> {
        Ok(Filters::PLUGINS_INSTALLED
            .iterate(&self.registry, None)?
            .collect())
    }

    /// Returns loaded plugin names in load order.
    pub fn loaded(&self) -> AppResult<Vec<String>> {
        Ok(Filters::PLUGINS_LOADED.iterate(&self.registry, None)?.collect())
    }

    /// Returns whether a plugin is loaded.
    pub fn is_loaded(&self, name: &str) -> AppResult<bool> {
        Ok(Filters::PLUGINS_LOADED
            .iterate(&self.registry, None)?
            .any(|loaded| loaded == name))
    }

    /// Lists installed plugins with their load state.
    pub fn list(&self) -> AppResult<Vec<PluginInfo>> {
        let loaded = self.loaded()?;
        let mut infos = Vec::new();
        for name in self.installed()? {
            let version = self
                .plugins
                .get(&name)
                .map(|p| p.version().to_string())
                .unwrap_or_default();
            infos.push(PluginInfo {
                loaded: loaded.contains(&name),
                name,
                version,
            });
        }
        Ok(infos)
    }
}
