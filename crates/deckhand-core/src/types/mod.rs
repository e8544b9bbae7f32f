//! Shared domain types.

pub mod job;

pub use job::{JobHelptext, JobPrerequisite, JobTask, TaskSpec};
