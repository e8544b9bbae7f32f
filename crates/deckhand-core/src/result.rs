//! Convenience result type alias for deckhand.

use crate::error::AppError;

/// A specialized `Result` type for deckhand operations.
pub type AppResult<T> = Result<T, AppError>;
