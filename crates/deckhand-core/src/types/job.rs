//! Job declaration types.
//!
//! A job is a named logical operation ("init", "createuser") made of tasks,
//! each running one command in one named service. Jobs may depend on other
//! jobs through prerequisite edges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a task's command is obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSpec {
    /// Path segments of a template that renders to a shell script.
    Template(Vec<String>),
    /// A literal argument vector.
    Command(Vec<String>),
}

impl TaskSpec {
    /// Builds a template spec from path segments.
    pub fn template<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Template(path.into_iter().map(Into::into).collect())
    }

    /// Builds a literal command spec from an argument vector.
    pub fn command<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Command(argv.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(path) => write!(f, "template:{}", path.join("/")),
            Self::Command(argv) => write!(f, "command:{}", argv.join(" ")),
        }
    }
}

/// One task of a job: `spec` runs inside `service`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTask {
    /// Name of the job this task belongs to.
    pub job: String,
    /// Service whose runtime environment executes the task.
    pub service: String,
    /// What to run.
    pub spec: TaskSpec,
}

impl JobTask {
    /// Creates a new job task.
    pub fn new(job: impl Into<String>, service: impl Into<String>, spec: TaskSpec) -> Self {
        Self {
            job: job.into(),
            service: service.into(),
            spec,
        }
    }
}

/// Edge `job → prerequisite`: the prerequisite job runs first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPrerequisite {
    /// Dependent job.
    pub job: String,
    /// Job that must run before `job`.
    pub prerequisite: String,
}

impl JobPrerequisite {
    /// Creates a new prerequisite edge.
    pub fn new(job: impl Into<String>, prerequisite: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            prerequisite: prerequisite.into(),
        }
    }
}

/// Human-readable description of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHelptext {
    /// Job name.
    pub job: String,
    /// Help text.
    pub text: String,
}

impl JobHelptext {
    /// Creates a new helptext entry.
    pub fn new(job: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            text: text.into(),
        }
    }
}
