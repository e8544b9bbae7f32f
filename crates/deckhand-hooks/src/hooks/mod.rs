//! Hook system — registry, typed handles, and the well-known hook catalog.

pub mod action;
pub mod catalog;
pub mod definitions;
pub mod filter;
pub mod registry;

pub use action::Action;
pub use catalog::{Actions, Filters};
pub use definitions::{HookKind, HookName, Priority};
pub use filter::Filter;
pub use registry::HookRegistry;
