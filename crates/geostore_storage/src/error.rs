//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred (allocation, mapping, growth or flush).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Removing persisted state failed.
    #[error("failed to remove {path}: {source}")]
    Cleanup {
        /// The file or directory that could not be removed.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The configured segment size cannot be used.
    #[error("invalid segment size: {size}")]
    InvalidSegmentSize {
        /// The rejected segment size.
        size: usize,
    },

    /// The memory has been closed.
    #[error("memory is closed")]
    Closed,
}
