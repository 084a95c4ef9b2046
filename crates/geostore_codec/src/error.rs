//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The buffer ends before the value does.
    #[error("buffer too small: {needed} bytes needed at position {position}, {available} available")]
    BufferTooSmall {
        /// Position of the access.
        position: usize,
        /// Number of bytes the access needed.
        needed: usize,
        /// Number of bytes left after `position`.
        available: usize,
    },

    /// A length header is smaller than the header itself or inconsistent
    /// with the payload.
    #[error("invalid length header {length} at position {position}")]
    InvalidLength {
        /// The decoded header value.
        length: u32,
        /// Position of the header.
        position: usize,
    },

    /// A variable-size value does not fit in a 4-byte length header.
    #[error("value of {size} bytes exceeds the length header range")]
    ValueTooLarge {
        /// The encoded size of the value.
        size: usize,
    },

    /// Invalid UTF-8 string.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// An integer does not fit in the configured byte width.
    #[error("value {value} does not fit in {width} bytes")]
    OutOfRange {
        /// The rejected value.
        value: i64,
        /// The configured width.
        width: usize,
    },

    /// A small integer codec was configured with an unsupported width.
    #[error("unsupported integer width: {width}")]
    InvalidWidth {
        /// The rejected width.
        width: usize,
    },
}
