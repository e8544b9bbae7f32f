//! Built-in job declarations for the core services.

use std::sync::Arc;

use deckhand_core::types::TaskSpec;
use deckhand_core::AppResult;
use deckhand_hooks::{Actions, HookRegistry, Priority, Scope};

use crate::catalog::JobCatalog;

/// Binds the core declarations to `core:ready`.
pub fn register(registry: &HookRegistry) {
    Actions::CORE_READY.add_named(
        registry,
        "core_jobs::declare",
        Priority::FIRST,
        |registry: &Arc<HookRegistry>| declare(registry),
    );
}

/// Declares the core jobs directly into `registry`.
pub fn declare(registry: &Arc<HookRegistry>) -> AppResult<()> {
    let catalog = JobCatalog::new(registry.clone());

    {
        let _guard = registry.enter([Scope::Global]);
        catalog.add_prerequisite("init", "pre-init");
        catalog.add_helptext("init", "Initialise all applications");
        catalog.add_helptext("createuser", "Create an LMS user");
        catalog.add_helptext(
            "settheme",
            "Assign a theme to the LMS and the CMS. Use 'default' to reset",
        );
        catalog.add_helptext("importdemocourse", "Import the demo course");
    }

    {
        let _guard = registry.enter([Scope::Global, Scope::app("lms")]);
        catalog.add_helptext("pre-init", "Tasks that run before any init task");
        catalog.add_task("init", "lms", TaskSpec::template(["tasks", "lms", "init"]));
        catalog.add_task(
            "createuser",
            "lms",
            TaskSpec::template(["tasks", "lms", "createuser"]),
        );
        catalog.add_task(
            "settheme",
            "lms",
            TaskSpec::template(["tasks", "lms", "settheme"]),
        );
    }

    {
        let _guard = registry.enter([Scope::Global, Scope::app("cms")]);
        catalog.add_task("init", "cms", TaskSpec::template(["tasks", "cms", "init"]));
        catalog.add_task(
            "importdemocourse",
            "cms",
            TaskSpec::template(["tasks", "cms", "importdemocourse"]),
        );
    }

    {
        let _guard = registry.enter([Scope::Global, Scope::app("mysql")]);
        catalog.add_task("init", "mysql", TaskSpec::template(["tasks", "mysql", "init"]));
    }

    Ok(())
}
