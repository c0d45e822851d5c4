//! Convenience result type alias for FileHost.

use crate::error::AppError;

/// A specialized `Result` type for FileHost operations.
pub type AppResult<T> = Result<T, AppError>;
