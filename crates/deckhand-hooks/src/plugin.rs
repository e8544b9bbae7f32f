//! Plugin trait and metadata.

use serde::{Deserialize, Serialize};

use deckhand_core::AppResult;

use crate::hooks::registry::HookRegistry;

/// Metadata about an installed plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Unique plugin name. Also the name of its scopes.
    pub name: String,
    /// Plugin version string.
    pub version: String,
    /// Whether the plugin's declarations are currently registered.
    pub loaded: bool,
}

/// Trait that all plugins must implement.
///
/// `register` runs inside the plugin's `plugin:<name>` and `app:<name>`
/// scopes, so every action and filter it adds can be retracted when the
/// plugin is disabled.
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// Returns the plugin name.
    fn name(&self) -> &str;

    /// Returns the plugin version.
    fn version(&self) -> &str {
        "0.0.0"
    }

    /// Declares the plugin's actions and filters.
    fn register(&self, registry: &HookRegistry) -> AppResult<()>;
}
