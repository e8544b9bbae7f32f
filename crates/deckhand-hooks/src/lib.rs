//! # deckhand-hooks
//!
//! Extension registry for deckhand. Provides:
//!
//! - Scope tags and a context stack that tags every new registration
//! - A hook registry with stable, priority-ordered registration
//! - Typed `Action` (broadcast) and `Filter` (value pipeline) handles
//! - Scope-based retraction of registrations
//! - Plugin lifecycle management (install, load, disable)

pub mod context;
pub mod hooks;
pub mod manager;
pub mod plugin;
pub mod scope;

pub use context::{ContextGuard, ContextStack};
pub use hooks::action::Action;
pub use hooks::catalog::{Actions, Filters, GenericAction, GenericFilter};
pub use hooks::definitions::{HookKind, HookName, Priority};
pub use hooks::filter::Filter;
pub use hooks::registry::{HookRegistry, Registration};
pub use manager::PluginManager;
pub use plugin::{Plugin, PluginInfo};
pub use scope::Scope;
