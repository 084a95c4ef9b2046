//! The segmented memory abstraction.

use crate::directory::MappedDirectoryMemory;
use crate::error::{StorageError, StorageResult};
use crate::file::MappedFileMemory;
use crate::heap::{HeapMemory, OffHeapMemory};
use crate::segment::Segment;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default segment size for heap and off-heap memories (1 MiB).
pub const DEFAULT_SEGMENT_SIZE: usize = 1 << 20;

/// Default segment size for memory-mapped backends (1 GiB).
pub const DEFAULT_MAPPED_SEGMENT_SIZE: usize = 1 << 30;

/// Segmented memory.
///
/// A memory owns a table of fixed-size segments that are allocated lazily on
/// first access and kept for its whole lifetime.
///
/// # Invariants
///
/// - `segment(i)` returns the same `Arc<Segment>` for every call with the same `i`
/// - distinct indices yield distinct segments
/// - `segment_size()` never changes after construction
/// - `close()` is idempotent; `clean()` implies `close()`
///
/// The four backends form a closed set, so dispatch is a plain `match`.
#[derive(Debug)]
pub enum Memory {
    /// Zeroed heap buffers.
    OnHeap(HeapMemory),
    /// Anonymous mappings outside the Rust allocator.
    OffHeap(OffHeapMemory),
    /// Views into one growing memory-mapped file.
    MappedFile(MappedFileMemory),
    /// One memory-mapped file per segment inside a directory.
    MappedDirectory(MappedDirectoryMemory),
}

impl Memory {
    /// Creates a heap memory.
    ///
    /// # Errors
    ///
    /// Returns an error if `segment_size` is zero.
    pub fn on_heap(segment_size: usize) -> StorageResult<Self> {
        Ok(Self::OnHeap(HeapMemory::new(segment_size)?))
    }

    /// Creates an off-heap memory.
    ///
    /// # Errors
    ///
    /// Returns an error if `segment_size` is zero.
    pub fn off_heap(segment_size: usize) -> StorageResult<Self> {
        Ok(Self::OffHeap(OffHeapMemory::new(segment_size)?))
    }

    /// Opens or creates a memory backed by a single mapped file.
    ///
    /// # Errors
    ///
    /// Returns an error if `segment_size` is zero or the file cannot be opened.
    pub fn mapped_file(path: &Path, segment_size: usize) -> StorageResult<Self> {
        Ok(Self::MappedFile(MappedFileMemory::open(path, segment_size)?))
    }

    /// Opens or creates a memory backed by a directory of mapped segment files.
    ///
    /// # Errors
    ///
    /// Returns an error if `segment_size` is zero or the directory cannot be created.
    pub fn mapped_directory(path: &Path, segment_size: usize) -> StorageResult<Self> {
        Ok(Self::MappedDirectory(MappedDirectoryMemory::open(
            path,
            segment_size,
        )?))
    }

    /// Returns the segment at `index`, allocating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] after `close()`, or an I/O error if
    /// the segment cannot be allocated or mapped.
    pub fn segment(&self, index: u32) -> StorageResult<Arc<Segment>> {
        match self {
            Self::OnHeap(memory) => memory.segment(index),
            Self::OffHeap(memory) => memory.segment(index),
            Self::MappedFile(memory) => memory.segment(index),
            Self::MappedDirectory(memory) => memory.segment(index),
        }
    }

    /// Returns the size of every segment in bytes.
    #[must_use]
    pub fn segment_size(&self) -> usize {
        self.table().segment_size()
    }

    /// Returns the number of segment slots in the table (allocated or not).
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.table().len()
    }

    /// Returns the number of bytes currently reserved by this memory.
    ///
    /// For the mapped backends this is the persisted extent on disk, which
    /// survives close and reopen.
    #[must_use]
    pub fn allocated_bytes(&self) -> u64 {
        match self {
            Self::OnHeap(memory) => memory.allocated_bytes(),
            Self::OffHeap(memory) => memory.allocated_bytes(),
            Self::MappedFile(memory) => memory.allocated_bytes(),
            Self::MappedDirectory(memory) => memory.allocated_bytes(),
        }
    }

    /// Flushes mapped segments to disk. No-op for heap kinds.
    ///
    /// # Errors
    ///
    /// Returns an error if a flush fails.
    pub fn flush(&self) -> StorageResult<()> {
        self.table().flush()
    }

    /// Releases every segment without deleting persisted data.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing a mapped segment fails.
    pub fn close(&self) -> StorageResult<()> {
        self.table().close()
    }

    /// Closes the memory and deletes any persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Cleanup`] if the file or directory cannot be removed.
    pub fn clean(&self) -> StorageResult<()> {
        match self {
            Self::OnHeap(memory) => memory.clean(),
            Self::OffHeap(memory) => memory.clean(),
            Self::MappedFile(memory) => memory.clean(),
            Self::MappedDirectory(memory) => memory.clean(),
        }
    }

    /// Returns whether `close()` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.table().is_closed()
    }

    /// Returns the backend kind.
    #[must_use]
    pub fn kind(&self) -> MemoryKind {
        match self {
            Self::OnHeap(_) => MemoryKind::OnHeap,
            Self::OffHeap(_) => MemoryKind::OffHeap,
            Self::MappedFile(_) => MemoryKind::MappedFile,
            Self::MappedDirectory(_) => MemoryKind::MappedDirectory,
        }
    }

    /// Returns the backing path for the mapped kinds.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::OnHeap(_) | Self::OffHeap(_) => None,
            Self::MappedFile(memory) => Some(memory.path()),
            Self::MappedDirectory(memory) => Some(memory.path()),
        }
    }

    fn table(&self) -> &SegmentTable {
        match self {
            Self::OnHeap(memory) => memory.table(),
            Self::OffHeap(memory) => memory.table(),
            Self::MappedFile(memory) => memory.table(),
            Self::MappedDirectory(memory) => memory.table(),
        }
    }
}

/// The backend of a [`Memory`], as named in configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    /// [`Memory::on_heap`]
    OnHeap,
    /// [`Memory::off_heap`]
    #[default]
    OffHeap,
    /// [`Memory::mapped_file`]
    MappedFile,
    /// [`Memory::mapped_directory`]
    MappedDirectory,
}

impl MemoryKind {
    /// Opens a memory of this kind. `path` is ignored by the heap kinds.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory cannot be created.
    pub fn open(self, path: &Path, segment_size: usize) -> StorageResult<Memory> {
        match self {
            Self::OnHeap => Memory::on_heap(segment_size),
            Self::OffHeap => Memory::off_heap(segment_size),
            Self::MappedFile => Memory::mapped_file(path, segment_size),
            Self::MappedDirectory => Memory::mapped_directory(path, segment_size),
        }
    }

    /// Returns whether memories of this kind survive the process.
    #[must_use]
    pub fn is_persistent(self) -> bool {
        matches!(self, Self::MappedFile | Self::MappedDirectory)
    }
}

/// The lazily grown table of segments shared by every backend.
#[derive(Debug)]
pub(crate) struct SegmentTable {
    segment_size: usize,
    segments: RwLock<Vec<Option<Arc<Segment>>>>,
    closed: AtomicBool,
}

impl SegmentTable {
    pub(crate) fn new(segment_size: usize) -> StorageResult<Self> {
        if segment_size == 0 {
            return Err(StorageError::InvalidSegmentSize { size: segment_size });
        }
        Ok(Self {
            segment_size,
            segments: RwLock::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }

    pub(crate) fn segment_size(&self) -> usize {
        self.segment_size
    }

    pub(crate) fn len(&self) -> usize {
        self.segments.read().len()
    }

    pub(crate) fn allocated(&self) -> usize {
        self.segments.read().iter().filter(|s| s.is_some()).count()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Returns the segment at `index`, calling `allocate` at most once per index.
    pub(crate) fn get_or_allocate(
        &self,
        index: u32,
        allocate: impl FnOnce(u32) -> StorageResult<Segment>,
    ) -> StorageResult<Arc<Segment>> {
        if self.is_closed() {
            return Err(StorageError::Closed);
        }
        let slot = index as usize;

        if let Some(Some(segment)) = self.segments.read().get(slot) {
            return Ok(Arc::clone(segment));
        }

        let mut segments = self.segments.write();
        if self.is_closed() {
            return Err(StorageError::Closed);
        }
        if segments.len() <= slot {
            segments.resize(slot + 1, None);
        }
        if let Some(segment) = &segments[slot] {
            return Ok(Arc::clone(segment));
        }
        let segment = Arc::new(allocate(index)?);
        segments[slot] = Some(Arc::clone(&segment));
        Ok(segment)
    }

    pub(crate) fn flush(&self) -> StorageResult<()> {
        for segment in self.segments.read().iter().flatten() {
            segment.flush()?;
        }
        Ok(())
    }

    /// Marks the table closed and releases every segment. Returns `false` if
    /// the table was already closed.
    pub(crate) fn release(&self, flush: bool) -> StorageResult<bool> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(false);
        }
        let mut segments = self.segments.write();
        let mut first_error = None;
        for segment in segments.iter().flatten() {
            if let Err(e) = segment.release(flush) {
                first_error.get_or_insert(e);
            }
        }
        segments.clear();
        match first_error {
            Some(e) => Err(e),
            None => Ok(true),
        }
    }

    pub(crate) fn close(&self) -> StorageResult<()> {
        self.release(true).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn memories(dir: &Path, segment_size: usize) -> Vec<Memory> {
        vec![
            Memory::on_heap(segment_size).unwrap(),
            Memory::off_heap(segment_size).unwrap(),
            Memory::mapped_file(&dir.join("file"), segment_size).unwrap(),
            Memory::mapped_directory(&dir.join("directory"), segment_size).unwrap(),
        ]
    }

    #[test]
    fn segment_identity_holds_for_every_backend() {
        let dir = tempdir().unwrap();
        for memory in memories(dir.path(), 1024) {
            let a = memory.segment(0).unwrap();
            let b = memory.segment(0).unwrap();
            let c = memory.segment(1).unwrap();
            assert!(Arc::ptr_eq(&a, &b), "{:?}", memory.kind());
            assert!(!Arc::ptr_eq(&a, &c), "{:?}", memory.kind());
        }
    }

    #[test]
    fn segment_size_matches_configuration() {
        let dir = tempdir().unwrap();
        for memory in memories(dir.path(), 4096) {
            assert_eq!(memory.segment_size(), 4096);
            assert_eq!(memory.segment(2).unwrap().capacity(), 4096);
        }
    }

    #[test]
    fn sparse_indices_grow_the_table() {
        let memory = Memory::on_heap(64).unwrap();
        memory.segment(5).unwrap();
        assert_eq!(memory.segment_count(), 6);
        assert_eq!(memory.allocated_bytes(), 64);
    }

    #[test]
    fn zero_segment_size_is_rejected() {
        assert!(matches!(
            Memory::on_heap(0),
            Err(StorageError::InvalidSegmentSize { size: 0 })
        ));
        assert!(Memory::off_heap(0).is_err());
    }

    #[test]
    fn close_is_idempotent_and_blocks_access() {
        let dir = tempdir().unwrap();
        for memory in memories(dir.path(), 256) {
            let segment = memory.segment(0).unwrap();
            memory.close().unwrap();
            memory.close().unwrap();
            assert!(memory.is_closed());
            assert!(matches!(memory.segment(0), Err(StorageError::Closed)));
            assert!(matches!(segment.read(|_| ()), Err(StorageError::Closed)));
        }
    }

    #[test]
    fn kind_round_trips_through_open() {
        let dir = tempdir().unwrap();
        for kind in [
            MemoryKind::OnHeap,
            MemoryKind::OffHeap,
            MemoryKind::MappedFile,
            MemoryKind::MappedDirectory,
        ] {
            let memory = kind.open(&dir.path().join(format!("{kind:?}")), 128).unwrap();
            assert_eq!(memory.kind(), kind);
            assert_eq!(memory.path().is_some(), kind.is_persistent());
        }
    }

    #[test]
    fn concurrent_allocation_returns_one_segment() {
        let memory = Arc::new(Memory::off_heap(512).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memory = Arc::clone(&memory);
                std::thread::spawn(move || memory.segment(3).unwrap())
            })
            .collect();
        let segments: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(segments.iter().all(|s| Arc::ptr_eq(s, &segments[0])));
    }
}
