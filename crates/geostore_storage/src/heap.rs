//! Heap and off-heap memories.

use crate::error::StorageResult;
use crate::memory::SegmentTable;
use crate::segment::Segment;
use memmap2::MmapMut;
use std::sync::Arc;
use tracing::debug;

/// A memory whose segments are zeroed heap buffers.
///
/// Suitable for tests and small extracts. Bounded by available RAM;
/// nothing is persisted, so `clean()` is equivalent to `close()`.
#[derive(Debug)]
pub struct HeapMemory {
    table: SegmentTable,
}

impl HeapMemory {
    /// Creates a heap memory with the given segment size.
    ///
    /// # Errors
    ///
    /// Returns an error if `segment_size` is zero.
    pub fn new(segment_size: usize) -> StorageResult<Self> {
        Ok(Self {
            table: SegmentTable::new(segment_size)?,
        })
    }

    /// Returns the segment at `index`, allocating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory is closed.
    pub fn segment(&self, index: u32) -> StorageResult<Arc<Segment>> {
        let size = self.table.segment_size();
        self.table
            .get_or_allocate(index, |index| Ok(Segment::heap(index, size)))
    }

    pub(crate) fn allocated_bytes(&self) -> u64 {
        self.table.allocated() as u64 * self.table.segment_size() as u64
    }

    pub(crate) fn clean(&self) -> StorageResult<()> {
        self.table.release(false).map(|_| ())
    }

    pub(crate) fn table(&self) -> &SegmentTable {
        &self.table
    }
}

/// A memory whose segments are anonymous mappings.
///
/// The bytes live outside the Rust allocator and are returned to the OS when
/// the memory is closed or dropped. Pages are zero-filled on first touch, so
/// large sparse segments cost nothing until written.
#[derive(Debug)]
pub struct OffHeapMemory {
    table: SegmentTable,
}

impl OffHeapMemory {
    /// Creates an off-heap memory with the given segment size.
    ///
    /// # Errors
    ///
    /// Returns an error if `segment_size` is zero.
    pub fn new(segment_size: usize) -> StorageResult<Self> {
        Ok(Self {
            table: SegmentTable::new(segment_size)?,
        })
    }

    /// Returns the segment at `index`, mapping it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory is closed or the mapping fails.
    pub fn segment(&self, index: u32) -> StorageResult<Arc<Segment>> {
        let size = self.table.segment_size();
        self.table.get_or_allocate(index, |index| {
            let map = MmapMut::map_anon(size)?;
            debug!(index, size, "mapped anonymous segment");
            Ok(Segment::mapped(index, map))
        })
    }

    pub(crate) fn allocated_bytes(&self) -> u64 {
        self.table.allocated() as u64 * self.table.segment_size() as u64
    }

    pub(crate) fn clean(&self) -> StorageResult<()> {
        self.table.release(false).map(|_| ())
    }

    pub(crate) fn table(&self) -> &SegmentTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_segments_are_independent() {
        let memory = HeapMemory::new(16).unwrap();
        memory.segment(0).unwrap().write(|b| b.fill(1)).unwrap();
        let untouched = memory.segment(1).unwrap().read(|b| b.iter().all(|v| *v == 0));
        assert!(untouched.unwrap());
    }

    #[test]
    fn heap_clean_releases_segments() {
        let memory = HeapMemory::new(16).unwrap();
        memory.segment(0).unwrap();
        assert_eq!(memory.allocated_bytes(), 16);
        memory.clean().unwrap();
        assert_eq!(memory.allocated_bytes(), 0);
        assert!(memory.segment(0).is_err());
    }

    #[test]
    fn off_heap_segment_is_writable() {
        let memory = OffHeapMemory::new(4096).unwrap();
        let segment = memory.segment(0).unwrap();
        segment.write(|b| b[4095] = 0xff).unwrap();
        assert_eq!(segment.read(|b| b[4095]).unwrap(), 0xff);
        assert_eq!(memory.allocated_bytes(), 4096);
    }
}
