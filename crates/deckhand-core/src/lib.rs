//! # deckhand-core
//!
//! Core crate for deckhand. Contains the unified error system, the layered
//! configuration schema, and the job declaration types shared by the hook
//! and job crates.
//!
//! This crate has **no** internal dependencies on other deckhand crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
