//! End-to-end tests: configuration through bootstrap to job execution.

mod helpers;
mod job_test;
mod plugin_test;
