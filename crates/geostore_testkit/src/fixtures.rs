//! Test fixtures over every memory backend.
//!
//! Mapped memories live in a temporary directory that is removed when the
//! fixture is dropped.

use geostore_codec::{DataType, LongDataType};
use geostore_core::{CacheConfig, DataList, DenseDataMap, SortedDataMap};
use geostore_storage::{Memory, MemoryKind};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Every memory backend, in declaration order.
pub const ALL_KINDS: [MemoryKind; 4] = [
    MemoryKind::OnHeap,
    MemoryKind::OffHeap,
    MemoryKind::MappedFile,
    MemoryKind::MappedDirectory,
];

/// A temporary directory handing out memories of any kind.
pub struct TestMemory {
    temp_dir: TempDir,
}

impl TestMemory {
    /// Creates a fixture with a fresh temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Returns the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Returns the path a mapped memory named `name` would use.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Opens a memory of `kind` named `name`.
    pub fn memory(&self, kind: MemoryKind, name: &str, segment_size: usize) -> Memory {
        kind.open(&self.path_of(name), segment_size)
            .expect("Failed to open memory")
    }

    /// Opens one memory of every kind, named after the kind.
    pub fn all(&self, segment_size: usize) -> Vec<Memory> {
        ALL_KINDS
            .iter()
            .map(|kind| self.memory(*kind, &format!("{kind:?}").to_lowercase(), segment_size))
            .collect()
    }

    /// Returns a cache configuration rooted in the temporary directory.
    pub fn config(&self, kind: MemoryKind, segment_size: usize) -> CacheConfig {
        CacheConfig::new()
            .memory_kind(kind)
            .segment_size(segment_size)
            .cache_dir(self.path())
    }

    /// Creates a fixed-size list of `kind` named `name`.
    pub fn fixed_list<D: DataType>(
        &self,
        kind: MemoryKind,
        name: &str,
        segment_size: usize,
        data_type: D,
    ) -> DataList<D> {
        DataList::fixed(self.memory(kind, name, segment_size), data_type)
            .expect("Failed to create list")
    }

    /// Creates a variable-size list of `kind` named `name`.
    pub fn variable_list<D: DataType>(
        &self,
        kind: MemoryKind,
        name: &str,
        segment_size: usize,
        data_type: D,
    ) -> DataList<D> {
        let offsets = self.fixed_list(kind, &format!("{name}_offsets"), segment_size, LongDataType);
        DataList::variable(self.memory(kind, name, segment_size), offsets, data_type)
            .expect("Failed to create list")
    }

    /// Creates a dense map of `kind` named `name`.
    pub fn dense_map<D: DataType>(
        &self,
        kind: MemoryKind,
        name: &str,
        segment_size: usize,
        data_type: D,
    ) -> DenseDataMap<D> {
        DenseDataMap::new(self.fixed_list(kind, name, segment_size, data_type))
            .expect("Failed to create dense map")
    }

    /// Creates a sorted map of `kind` named `name` with fixed-size values.
    pub fn sorted_map<D: DataType>(
        &self,
        kind: MemoryKind,
        name: &str,
        segment_size: usize,
        data_type: D,
    ) -> SortedDataMap<D> {
        SortedDataMap::new(
            self.fixed_list(kind, &format!("{name}_chunks"), segment_size, LongDataType),
            self.fixed_list(kind, &format!("{name}_keys"), segment_size, LongDataType),
            self.fixed_list(kind, &format!("{name}_values"), segment_size, data_type),
        )
        .expect("Failed to create sorted map")
    }
}

impl Default for TestMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `f` once with a memory of every kind.
///
/// # Example
///
/// ```
/// use geostore_testkit::with_each_memory;
///
/// with_each_memory(1024, |memory| {
///     assert_eq!(memory.segment(0).unwrap().capacity(), 1024);
/// });
/// ```
pub fn with_each_memory<F>(segment_size: usize, mut f: F)
where
    F: FnMut(Memory),
{
    let fixture = TestMemory::new();
    for memory in fixture.all(segment_size) {
        f(memory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_memory_per_kind() {
        let fixture = TestMemory::new();
        let kinds: Vec<_> = fixture.all(256).iter().map(Memory::kind).collect();
        assert_eq!(kinds, ALL_KINDS.to_vec());
    }

    #[test]
    fn mapped_memories_live_in_the_fixture() {
        let fixture = TestMemory::new();
        let memory = fixture.memory(MemoryKind::MappedFile, "nodes", 128);
        memory.segment(0).unwrap();
        assert!(fixture.path_of("nodes").is_file());
    }

    #[test]
    fn each_memory_is_visited() {
        let mut count = 0;
        with_each_memory(64, |_| count += 1);
        assert_eq!(count, 4);
    }
}
