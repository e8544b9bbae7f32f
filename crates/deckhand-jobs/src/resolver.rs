//! Dependency resolver — expands a job into the ordered list of tasks to run.

use tracing::debug;

use deckhand_core::config::UnknownJobPolicy;
use deckhand_core::error::AppError;
use deckhand_core::types::JobTask;
use deckhand_core::AppResult;
use deckhand_hooks::Scope;

use crate::catalog::JobCatalog;

/// A task selected for execution, in the order it must run.
pub type ResolvedTask = JobTask;

/// Walks prerequisite edges depth-first and collects tasks.
///
/// Prerequisite edges are always read across all scopes; the scope limit
/// narrows the tasks collected at every level of the walk.
#[derive(Debug, Clone, Copy)]
pub struct JobResolver<'a> {
    catalog: &'a JobCatalog,
    policy: UnknownJobPolicy,
}

impl<'a> JobResolver<'a> {
    /// Creates a resolver over a catalog.
    pub fn new(catalog: &'a JobCatalog, policy: UnknownJobPolicy) -> Self {
        Self { catalog, policy }
    }

    /// Resolves `job` into its ordered task list.
    ///
    /// Every prerequisite's tasks come before the tasks of the job that
    /// requires it. A cycle fails with a configuration error naming the full
    /// chain. A job that was never declared fails or resolves to nothing
    /// depending on the [`UnknownJobPolicy`].
    pub fn resolve(&self, job: &str, scope: Option<&Scope>) -> AppResult<Vec<ResolvedTask>> {
        if !self.catalog.is_declared(job)? {
            match self.policy {
                UnknownJobPolicy::Error => {
                    return Err(AppError::configuration(format!("Unknown job '{job}'")));
                }
                UnknownJobPolicy::Ignore => {
                    debug!(job = %job, "Ignoring unknown job");
                    return Ok(Vec::new());
                }
            }
        }

        let mut chain = Vec::new();
        let mut plan = Vec::new();
        self.visit(job, scope, &mut chain, &mut plan)?;
        Ok(plan)
    }

    fn visit(
        &self,
        job: &str,
        scope: Option<&Scope>,
        chain: &mut Vec<String>,
        plan: &mut Vec<ResolvedTask>,
    ) -> AppResult<()> {
        for prerequisite in self.catalog.prerequisites(job)? {
            if chain.iter().any(|visited| visited == job) {
                let mut cycle = chain.clone();
                cycle.push(job.to_string());
                return Err(AppError::configuration(format!(
                    "Cyclic prerequisite: {}",
                    cycle.join(" -> ")
                )));
            }

            chain.push(job.to_string());
            self.visit(&prerequisite, scope, chain, plan)?;
            chain.pop();
        }

        let tasks = self.catalog.tasks(job, scope)?;
        debug!(job = %job, tasks = tasks.len(), "Resolved job tasks");
        plan.extend(tasks);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use deckhand_core::ErrorKind;
    use deckhand_core::types::TaskSpec;
    use deckhand_hooks::HookRegistry;

    use super::*;

    fn catalog() -> JobCatalog {
        JobCatalog::new(Arc::new(HookRegistry::new()))
    }

    fn services(plan: &[ResolvedTask]) -> Vec<String> {
        plan.iter()
            .map(|task| format!("{}:{}", task.job, task.service))
            .collect()
    }

    #[test]
    fn test_prerequisites_run_first() {
        let catalog = catalog();
        catalog.add_task("init", "lms", TaskSpec::command(["true"]));
        catalog.add_task("pre-init", "mysql", TaskSpec::command(["true"]));
        catalog.add_task("init", "cms", TaskSpec::command(["true"]));
        catalog.add_prerequisite("init", "pre-init");

        let plan = JobResolver::new(&catalog, UnknownJobPolicy::Error)
            .resolve("init", None)
            .unwrap();
        assert_eq!(services(&plan), vec!["pre-init:mysql", "init:lms", "init:cms"]);
    }

    #[test]
    fn test_cycle_names_full_chain() {
        let catalog = catalog();
        catalog.add_task("init", "lms", TaskSpec::command(["true"]));
        catalog.add_prerequisite("init", "pre-init");
        catalog.add_prerequisite("pre-init", "init");

        let err = JobResolver::new(&catalog, UnknownJobPolicy::Error)
            .resolve("init", None)
            .unwrap_err();
        assert!(err.is(ErrorKind::Configuration));
        assert_eq!(
            err.message,
            "Cyclic prerequisite: init -> pre-init -> init"
        );
    }

    #[test]
    fn test_scope_limit_applies_to_tasks() {
        let catalog = catalog();
        {
            let _guard = catalog.registry().enter([Scope::app("lms")]);
            catalog.add_task("init", "lms", TaskSpec::command(["true"]));
        }
        {
            let _guard = catalog.registry().enter([Scope::app("cms")]);
            catalog.add_task("init", "cms", TaskSpec::command(["true"]));
        }

        let plan = JobResolver::new(&catalog, UnknownJobPolicy::Error)
            .resolve("init", Some(&Scope::from_limit("lms")))
            .unwrap();
        assert_eq!(services(&plan), vec!["init:lms"]);
    }

    #[test]
    fn test_scope_limit_keeps_global_prerequisites() {
        let catalog = catalog();
        catalog.add_prerequisite("init", "pre-init");
        {
            let _guard = catalog.registry().enter([Scope::app("lms")]);
            catalog.add_task("pre-init", "lms", TaskSpec::command(["true"]));
            catalog.add_task("init", "lms", TaskSpec::command(["true"]));
        }
        {
            let _guard = catalog.registry().enter([Scope::app("cms")]);
            catalog.add_task("pre-init", "cms", TaskSpec::command(["true"]));
        }

        let plan = JobResolver::new(&catalog, UnknownJobPolicy::Error)
            .resolve("init", Some(&Scope::app("lms")))
            .unwrap();
        assert_eq!(services(&plan), vec!["pre-init:lms", "init:lms"]);
    }

    #[test]
    fn test_declared_job_without_tasks_is_noop() {
        let catalog = catalog();
        catalog.add_helptext("pre-init", "Runs before init");

        let plan = JobResolver::new(&catalog, UnknownJobPolicy::Error)
            .resolve("pre-init", None)
            .unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_unknown_job_policy() {
        let catalog = catalog();

        let err = JobResolver::new(&catalog, UnknownJobPolicy::Error)
            .resolve("nope", None)
            .unwrap_err();
        assert!(err.is(ErrorKind::Configuration));

        let plan = JobResolver::new(&catalog, UnknownJobPolicy::Ignore)
            .resolve("nope", None)
            .unwrap();
        assert!(plan.is_empty());
    }
}
