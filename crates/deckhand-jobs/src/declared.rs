//! Plugins declared as data in configuration.

use deckhand_core::config::DeclaredPlugin;
use deckhand_core::AppResult;
use deckhand_hooks::{HookRegistry, Plugin};

use crate::filters::JobFilters;

/// A data-only plugin contributing tasks, prerequisites and helptexts.
#[derive(Debug, Clone)]
pub struct DeclaredJobsPlugin {
    declaration: DeclaredPlugin,
}

impl DeclaredJobsPlugin {
    pub fn new(declaration: DeclaredPlugin) -> Self {
        Self { declaration }
    }
}

impl Plugin for DeclaredJobsPlugin {
    fn name(&self) -> &str {
        &self.declaration.name
    }

    fn version(&self) -> &str {
        &self.declaration.version
    }

    fn register(&self, registry: &HookRegistry) -> AppResult<()> {
        let declaration = &self.declaration;
        if !declaration.tasks.is_empty() {
            JobFilters::TASKS.add_items(registry, declaration.tasks.clone());
        }
        if !declaration.prerequisites.is_empty() {
            JobFilters::PREREQUISITES.add_items(registry, declaration.prerequisites.clone());
        }
        if !declaration.helptexts.is_empty() {
            JobFilters::HELPTEXTS.add_items(registry, declaration.helptexts.clone());
        }
        Ok(())
    }
}
