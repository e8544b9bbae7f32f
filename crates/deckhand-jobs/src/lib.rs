//! Job orchestration for deckhand.
//!
//! This crate provides:
//! - A job catalog built from filter contributions (tasks, prerequisites, helptexts)
//! - A dependency resolver with cycle detection and scope limiting
//! - A task renderer turning task specs into shell commands
//! - A job executor that drives tasks through a backend runner, sequentially
//! - Local-runtime and cluster backends
//! - Core job declarations, declarative plugins, and engine bootstrap

pub mod backend;
pub mod catalog;
pub mod core_jobs;
pub mod declared;
pub mod engine;
pub mod executor;
pub mod filters;
pub mod render;
pub mod resolver;

pub use backend::JobRunner;
pub use catalog::{JobCatalog, JobSummary};
pub use declared::DeclaredJobsPlugin;
pub use engine::Engine;
pub use executor::{ExplainedTask, JobExecutor};
pub use filters::JobFilters;
pub use render::{EnvRenderer, TaskRenderer};
pub use resolver::{JobResolver, ResolvedTask};
