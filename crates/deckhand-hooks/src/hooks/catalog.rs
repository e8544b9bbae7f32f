//! Well-known hooks shared by the core and plugins.
//!
//! Job-related filters live next to the job catalog in `deckhand-jobs`.

use std::sync::Arc;

use serde_json::Value;

use super::action::Action;
use super::filter::Filter;
use super::registry::HookRegistry;

/// Untyped action for hooks outside the catalog.
pub type GenericAction = Action<Value>;

/// Untyped filter for hooks outside the catalog.
pub type GenericFilter = Filter<Value, Value>;

/// Catalog of actions.
#[derive(Debug)]
pub struct Actions;

impl Actions {
    /// Fired once core declarations may be registered. The payload is the
    /// registry to declare into.
    pub const CORE_READY: Action<Arc<HookRegistry>> = Action::new("core:ready");

    /// Fired after all enabled plugins have been loaded.
    pub const PLUGINS_LOADED: Action = Action::new("plugins:loaded");

    /// Fired to run a plugin's registration. The payload is the registry the
    /// plugin declares into.
    pub fn load_plugin(name: &str) -> Action<Arc<HookRegistry>> {
        Action::dynamic(format!("plugins:load:{name}"))
    }

    /// Untyped action, for hooks defined by plugins among themselves.
    pub fn generic(name: impl Into<String>) -> GenericAction {
        Action::dynamic(name)
    }
}

/// Catalog of filters.
#[derive(Debug)]
pub struct Filters;

impl Filters {
    /// Names of installed plugins.
    pub const PLUGINS_INSTALLED: Filter<Vec<String>> = Filter::new("plugins:installed");

    /// Names of loaded plugins.
    pub const PLUGINS_LOADED: Filter<Vec<String>> = Filter::new("plugins:loaded");

    /// Untyped filter, for hooks defined by plugins among themselves.
    pub fn generic(name: impl Into<String>) -> GenericFilter {
        Filter::dynamic(name)
    }
}
