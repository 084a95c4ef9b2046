//! Fixed-size addressable byte regions.

use crate::error::{StorageError, StorageResult};
use memmap2::MmapMut;
use parking_lot::RwLock;
use std::fmt;

/// The bytes behind a segment.
enum SegmentBuffer {
    /// A zeroed heap allocation.
    Heap(Box<[u8]>),
    /// An anonymous or file-backed mapping.
    Mapped(MmapMut),
    /// The owning memory was closed and the bytes were released.
    Released,
}

/// A fixed-capacity contiguous byte region inside a [`crate::Memory`].
///
/// Segments are handed out as `Arc<Segment>` and are shared by everything
/// built on the same memory. Access is scoped through [`Segment::read`] and
/// [`Segment::write`], which hold the segment lock for the duration of the
/// closure.
///
/// # Thread Safety
///
/// Any number of readers may access a segment concurrently; writers are
/// exclusive per segment.
pub struct Segment {
    index: u32,
    capacity: usize,
    buffer: RwLock<SegmentBuffer>,
}

impl Segment {
    pub(crate) fn heap(index: u32, capacity: usize) -> Self {
        Self {
            index,
            capacity,
            buffer: RwLock::new(SegmentBuffer::Heap(vec![0u8; capacity].into_boxed_slice())),
        }
    }

    pub(crate) fn mapped(index: u32, map: MmapMut) -> Self {
        Self {
            index,
            capacity: map.len(),
            buffer: RwLock::new(SegmentBuffer::Mapped(map)),
        }
    }

    /// Returns the index of this segment within its memory.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the number of bytes in this segment.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Runs `f` with shared access to the segment bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] if the owning memory was closed.
    pub fn read<R>(&self, f: impl FnOnce(&[u8]) -> R) -> StorageResult<R> {
        let buffer = self.buffer.read();
        match &*buffer {
            SegmentBuffer::Heap(bytes) => Ok(f(bytes)),
            SegmentBuffer::Mapped(map) => Ok(f(map)),
            SegmentBuffer::Released => Err(StorageError::Closed),
        }
    }

    /// Runs `f` with exclusive access to the segment bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] if the owning memory was closed.
    pub fn write<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> StorageResult<R> {
        let mut buffer = self.buffer.write();
        match &mut *buffer {
            SegmentBuffer::Heap(bytes) => Ok(f(bytes)),
            SegmentBuffer::Mapped(map) => Ok(f(map)),
            SegmentBuffer::Released => Err(StorageError::Closed),
        }
    }

    /// Flushes a file-backed mapping to disk. No-op for heap segments.
    pub(crate) fn flush(&self) -> StorageResult<()> {
        if let SegmentBuffer::Mapped(map) = &*self.buffer.read() {
            map.flush()?;
        }
        Ok(())
    }

    /// Flushes and drops the underlying bytes (unmapping them if mapped).
    pub(crate) fn release(&self, flush: bool) -> StorageResult<()> {
        let mut buffer = self.buffer.write();
        if flush {
            if let SegmentBuffer::Mapped(map) = &*buffer {
                map.flush()?;
            }
        }
        *buffer = SegmentBuffer::Released;
        Ok(())
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.buffer.read() {
            SegmentBuffer::Heap(_) => "heap",
            SegmentBuffer::Mapped(_) => "mapped",
            SegmentBuffer::Released => "released",
        };
        f.debug_struct("Segment")
            .field("index", &self.index)
            .field("capacity", &self.capacity)
            .field("state", &state)
            .finish()
    }
}
