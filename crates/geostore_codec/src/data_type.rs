//! The serialization contract shared by every codec.

use crate::error::{CodecError, CodecResult};
use bytes::{Buf, BufMut};

/// Width of the length header that prefixes every variable-size value.
///
/// The header is a big-endian `u32` holding the **total** encoded size of the
/// value in bytes, header included, so a reader can skip a value without
/// decoding its payload.
pub const LENGTH_HEADER_SIZE: usize = 4;

/// Describes how a value is measured, written into and read from a byte
/// region at a given position.
///
/// # Invariants
///
/// - `read(buf, p)` applied to the bytes produced by `write(buf, p, v)`
///   returns a value equal to `v`
/// - `size_at(buf, p)` equals `size(v)` for the value written at `p`
/// - when `fixed_size()` is `Some(n)`, `size(v) == n` for every value
///
/// Implementations are stateless and can be shared across threads.
pub trait DataType: Send + Sync {
    /// The decoded value type.
    type Value;

    /// Returns the number of bytes needed to encode `value`.
    fn size(&self, value: &Self::Value) -> usize;

    /// Returns the number of bytes occupied by the value encoded at `position`.
    ///
    /// # Errors
    ///
    /// Returns an error if the header at `position` is truncated or invalid.
    fn size_at(&self, buf: &[u8], position: usize) -> CodecResult<usize>;

    /// Returns the encoded size shared by every value, if there is one.
    fn fixed_size(&self) -> Option<usize> {
        None
    }

    /// Encodes `value` at `position`.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is too small or the value cannot be encoded.
    fn write(&self, buf: &mut [u8], position: usize, value: &Self::Value) -> CodecResult<()>;

    /// Decodes the value at `position`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are truncated or malformed.
    fn read(&self, buf: &[u8], position: usize) -> CodecResult<Self::Value>;
}

/// Returns `buf[position..position + len]` or a [`CodecError::BufferTooSmall`].
pub(crate) fn window(buf: &[u8], position: usize, len: usize) -> CodecResult<&[u8]> {
    position
        .checked_add(len)
        .and_then(|end| buf.get(position..end))
        .ok_or(CodecError::BufferTooSmall {
            position,
            needed: len,
            available: buf.len().saturating_sub(position),
        })
}

/// Mutable counterpart of [`window`].
pub(crate) fn window_mut(buf: &mut [u8], position: usize, len: usize) -> CodecResult<&mut [u8]> {
    match position.checked_add(len) {
        Some(end) if end <= buf.len() => Ok(&mut buf[position..end]),
        _ => Err(CodecError::BufferTooSmall {
            position,
            needed: len,
            available: buf.len().saturating_sub(position),
        }),
    }
}

/// Reads and validates the length header of a variable-size value.
pub(crate) fn read_header(buf: &[u8], position: usize) -> CodecResult<usize> {
    let length = window(buf, position, LENGTH_HEADER_SIZE)?.get_u32();
    let size = length as usize;
    if size < LENGTH_HEADER_SIZE {
        return Err(CodecError::InvalidLength { length, position });
    }
    Ok(size)
}

/// Writes the length header of a variable-size value of `size` total bytes.
pub(crate) fn write_header(buf: &mut [u8], position: usize, size: usize) -> CodecResult<()> {
    let length = u32::try_from(size).map_err(|_| CodecError::ValueTooLarge { size })?;
    window_mut(buf, position, LENGTH_HEADER_SIZE)?.put_u32(length);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_rejects_overflowing_ranges() {
        let buf = [0u8; 8];
        assert!(window(&buf, 4, 4).is_ok());
        assert_eq!(
            window(&buf, 6, 4),
            Err(CodecError::BufferTooSmall {
                position: 6,
                needed: 4,
                available: 2,
            })
        );
        assert!(window(&buf, usize::MAX, 2).is_err());
    }

    #[test]
    fn header_round_trip() {
        let mut buf = [0u8; 8];
        write_header(&mut buf, 2, 300).unwrap();
        assert_eq!(&buf[2..6], &300u32.to_be_bytes());
        assert_eq!(read_header(&buf, 2).unwrap(), 300);
    }

    #[test]
    fn header_smaller_than_itself_is_invalid() {
        let buf = [0, 0, 0, 3];
        assert_eq!(
            read_header(&buf, 0),
            Err(CodecError::InvalidLength {
                length: 3,
                position: 0
            })
        );
    }
}
