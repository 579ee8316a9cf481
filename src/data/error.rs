//! Trace data error types
//!
//! Defines the errors that can surface from loading entries, building
//! collections and binning.

use std::collections::TryReserveError;
use thiserror::Error;

/// Errors that can occur in the trace data layer
#[derive(Error, Debug)]
pub enum TraceError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding failed
    #[error("CSV error: {0}")]
    Csv(String),

    /// Entries are not ordered by timestamp
    #[error("Entries are not sorted by timestamp at index {index}")]
    Unsorted { index: usize },

    /// Index or count buffers could not be allocated
    #[error("Allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

impl From<csv::Error> for TraceError {
    fn from(err: csv::Error) -> Self {
        TraceError::Csv(err.to_string())
    }
}

/// Result type alias for trace data operations
pub type TraceResult<T> = Result<T, TraceError>;
