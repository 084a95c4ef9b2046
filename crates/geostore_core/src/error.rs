//! Error types for geostore core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in lists, maps and the cache helpers.
///
/// A missing key is never an error: map lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Memory backend error.
    #[error("storage error: {0}")]
    Storage(#[from] geostore_storage::StorageError),

    /// Encoding or decoding error.
    #[error("codec error: {0}")]
    Codec(#[from] geostore_codec::CodecError),

    /// I/O error outside a memory backend (configuration files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed configuration file.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A list index at or beyond the list length.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The requested index.
        index: u64,
        /// The list length.
        len: u64,
    },

    /// A variable-size value does not fit in one segment.
    #[error("value of {size} bytes exceeds the segment size {segment_size}")]
    ValueTooLarge {
        /// Encoded size of the value.
        size: usize,
        /// Segment size of the memory.
        segment_size: usize,
    },

    /// The element layout is incompatible with the memory.
    #[error("invalid layout: {message}")]
    InvalidLayout {
        /// Description of the incompatibility.
        message: String,
    },

    /// A sorted map received a key smaller than the last inserted one.
    #[error("key {key} inserted after larger key {last}")]
    UnsortedKey {
        /// The rejected key.
        key: i64,
        /// The last inserted key.
        last: i64,
    },

    /// The key cannot be stored by this map.
    #[error("invalid key {key}: {reason}")]
    InvalidKey {
        /// The rejected key.
        key: i64,
        /// Why the key was rejected.
        reason: &'static str,
    },

    /// The operation is not supported by this map.
    #[error("{operation} is not supported by {map}")]
    Unsupported {
        /// The rejected operation.
        operation: &'static str,
        /// The map type.
        map: &'static str,
    },

    /// A fixed-capacity map has no free slot left.
    #[error("map is full: capacity {capacity}")]
    MapFull {
        /// Number of slots in the map.
        capacity: u64,
    },
}

impl CoreError {
    /// Creates an invalid layout error.
    pub fn invalid_layout(message: impl Into<String>) -> Self {
        Self::InvalidLayout {
            message: message.into(),
        }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported(operation: &'static str, map: &'static str) -> Self {
        Self::Unsupported { operation, map }
    }

    /// Returns whether the memory under the structure has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Storage(geostore_storage::StorageError::Closed))
    }
}
