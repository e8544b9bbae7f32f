//! Filters that make up the job declaration layer.

use deckhand_core::types::{JobHelptext, JobPrerequisite, JobTask};
use deckhand_hooks::Filter;

/// Catalog of job filters.
#[derive(Debug)]
pub struct JobFilters;

impl JobFilters {
    /// Tasks of every job, in registration order.
    pub const TASKS: Filter<Vec<JobTask>> = Filter::new("jobs:tasks");

    /// Prerequisite edges between jobs.
    pub const PREREQUISITES: Filter<Vec<JobPrerequisite>> = Filter::new("jobs:prerequisites");

    /// Job descriptions. The first entry for a job wins.
    pub const HELPTEXTS: Filter<Vec<JobHelptext>> = Filter::new("jobs:helptexts");
}
