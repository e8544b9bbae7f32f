//! Job catalog — declaration and lookup of tasks, prerequisites and
//! helptexts through the job filters.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use deckhand_core::types::{JobHelptext, JobPrerequisite, JobTask, TaskSpec};
use deckhand_core::AppResult;
use deckhand_hooks::{HookRegistry, Scope};

use crate::filters::JobFilters;

/// A job name with its help text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    /// Job name.
    pub name: String,
    /// First registered helptext, or empty.
    pub help: String,
}

/// Read and write access to job declarations held in a [`HookRegistry`].
///
/// Declarations are tagged with the scopes active on the registry's context
/// stack, exactly like any other filter contribution.
#[derive(Debug, Clone)]
pub struct JobCatalog {
    registry: Arc<HookRegistry>,
}

impl JobCatalog {
    /// Creates a catalog over a registry.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the underlying registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    /// Declares a task of `job` running in `service`.
    pub fn add_task(&self, job: &str, service: &str, spec: TaskSpec) {
        JobFilters::TASKS.add_item(&self.registry, JobTask::new(job, service, spec));
    }

    /// Declares that `prerequisite` must run before `job`.
    pub fn add_prerequisite(&self, job: &str, prerequisite: &str) {
        JobFilters::PREREQUISITES.add_item(&self.registry, JobPrerequisite::new(job, prerequisite));
    }

    /// Declares the help text of `job`.
    pub fn add_helptext(&self, job: &str, text: &str) {
        JobFilters::HELPTEXTS.add_item(&self.registry, JobHelptext::new(job, text));
    }

    /// Returns the tasks of `job` visible in `scope`, in registry order.
    pub fn tasks(&self, job: &str, scope: Option<&Scope>) -> AppResult<Vec<JobTask>> {
        Ok(JobFilters::TASKS
            .iterate(&self.registry, scope)?
            .filter(|task| task.job == job)
            .collect())
    }

    /// Returns the direct prerequisites of `job`, in registry order.
    pub fn prerequisites(&self, job: &str) -> AppResult<Vec<String>> {
        Ok(JobFilters::PREREQUISITES
            .iterate(&self.registry, None)?
            .filter(|edge| edge.job == job)
            .map(|edge| edge.prerequisite)
            .collect())
    }

    /// Returns the first registered help text of `job`.
    pub fn helptext(&self, job: &str) -> AppResult<Option<String>> {
        Ok(JobFilters::HELPTEXTS
            .iterate(&self.registry, None)?
            .find(|entry| entry.job == job)
            .map(|entry| entry.text))
    }

    /// Returns whether anything at all was declared for `job`.
    pub fn is_declared(&self, job: &str) -> AppResult<bool> {
        Ok(!self.tasks(job, None)?.is_empty()
            || !self.prerequisites(job)?.is_empty()
            || self.helptext(job)?.is_some())
    }

    /// Lists every job that declares a task, a prerequisite or a helptext,
    /// sorted by name.
    pub fn list_jobs(&self) -> AppResult<Vec<JobSummary>> {
        let mut jobs: BTreeMap<String, String> = BTreeMap::new();

        for entry in JobFilters::HELPTEXTS.iterate(&self.registry, None)? {
            jobs.entry(entry.job).or_insert(entry.text);
        }
        for task in JobFilters::TASKS.iterate(&self.registry, None)? {
            jobs.entry(task.job).or_default();
        }
        for edge in JobFilters::PREREQUISITES.iterate(&self.registry, None)? {
            jobs.entry(edge.job).or_default();
        }

        Ok(jobs
            .into_iter()
            .map(|(name, help)| JobSummary { name, help })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> JobCatalog {
        JobCatalog::new(Arc::new(HookRegistry::new()))
    }

    #[test]
    fn test_tasks_filtered_by_job_and_scope() {
        let catalog = catalog();
        {
            let _guard = catalog.registry().enter([Scope::app("lms")]);
            catalog.add_task("init", "lms", TaskSpec::template(["tasks", "lms", "init"]));
        }
        {
            let _guard = catalog.registry().enter([Scope::app("cms")]);
            catalog.add_task("init", "cms", TaskSpec::template(["tasks", "cms", "init"]));
            catalog.add_task("importdemocourse", "cms", TaskSpec::command(["true"]));
        }

        let all = catalog.tasks("init", None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].service, "lms");

        let lms = catalog.tasks("init", Some(&Scope::app("lms"))).unwrap();
        assert_eq!(lms.len(), 1);
        assert_eq!(lms[0].service, "lms");
    }

    #[test]
    fn test_first_helptext_wins() {
        let catalog = catalog();
        catalog.add_helptext("init", "Initialise all applications");
        catalog.add_helptext("init", "Something else");

        assert_eq!(
            catalog.helptext("init").unwrap().as_deref(),
            Some("Initialise all applications")
        );
    }

    #[test]
    fn test_list_jobs_sorted() {
        let catalog = catalog();
        catalog.add_task("settheme", "lms", TaskSpec::command(["true"]));
        catalog.add_prerequisite("init", "pre-init");
        catalog.add_helptext("createuser", "Create a user");

        let jobs = catalog.list_jobs().unwrap();
        let names: Vec<&str> = jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["createuser", "init", "settheme"]);
        assert_eq!(jobs[0].help, "Create a user");
        assert!(jobs[1].help.is_empty());
    }

    #[test]
    fn test_is_declared() {
        let catalog = catalog();
        catalog.add_prerequisite("init", "pre-init");

        assert!(catalog.is_declared("init").unwrap());
        assert!(!catalog.is_declared("pre-init").unwrap());
        assert!(!catalog.is_declared("unknown").unwrap());
    }
}
