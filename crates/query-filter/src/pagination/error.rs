//! Error types for pagination.

use std::convert::Infallible;

use thiserror::Error;

use crate::filter::FilterError;

/// Errors raised while building or running a paginated query.
///
/// `E` is the executor's error type; it defaults to [`Infallible`] for
/// operations that never touch an executor.
#[derive(Debug, Error)]
pub enum PaginationError<E = Infallible> {
    /// Offset is negative, not a number, or above the configured maximum.
    #[error("invalid offset: {value}")]
    InvalidOffset {
        /// The rejected value.
        value: String,
    },

    /// Limit is below -1, not a number, or above the configured maximum.
    #[error("invalid limit: {value}")]
    InvalidLimit {
        /// The rejected value.
        value: String,
    },

    /// The request URL's query string could not be decoded or encoded.
    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    /// The filter expression failed to compile.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// The query executor failed.
    #[error("query execution failed: {0}")]
    Executor(#[source] E),
}

impl PaginationError {
    /// Converts an executor-free error into one for any executor type.
    pub fn widen<E>(self) -> PaginationError<E> {
        match self {
            PaginationError::InvalidOffset { value } => PaginationError::InvalidOffset { value },
            PaginationError::InvalidLimit { value } => PaginationError::InvalidLimit { value },
            PaginationError::InvalidQuery(message) => PaginationError::InvalidQuery(message),
            PaginationError::Filter(err) => PaginationError::Filter(err),
            PaginationError::Executor(never) => match never {},
        }
    }
}

impl<E> PaginationError<E> {
    /// HTTP status an API layer should answer with.
    ///
    /// Executor failures are server errors; everything else is 400.
    pub fn status_code(&self) -> u16 {
        match self {
            PaginationError::Executor(_) => 500,
            _ => 400,
        }
    }
}
