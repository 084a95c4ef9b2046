//! Cache configuration.

use crate::error::CoreResult;
use crate::list::DataList;
use crate::map::{DenseDataMap, IndexedDataMap, SortedDataMap, DEFAULT_CHUNK_SHIFT};
use geostore_codec::{DataType, LongDataType};
use geostore_storage::{Memory, MemoryKind, DEFAULT_SEGMENT_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default number of entries buffered by a [`crate::BatchWriter`].
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Configuration for the lists and maps of one cache.
///
/// Every named structure gets its own memory; for the mapped kinds that is
/// a file or directory named after the structure inside `cache_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Memory backend for every structure.
    pub memory: MemoryKind,

    /// Segment size in bytes.
    pub segment_size: usize,

    /// Entries buffered before a batch is flushed.
    pub batch_size: usize,

    /// Chunk width of sorted maps.
    pub chunk_shift: u32,

    /// Root directory of the mapped kinds.
    pub cache_dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory: MemoryKind::default(),
            segment_size: DEFAULT_SEGMENT_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            chunk_shift: DEFAULT_CHUNK_SHIFT,
            cache_dir: PathBuf::from("cache"),
        }
    }
}

impl CacheConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file. Missing fields take their
    /// default value.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_json_file(&self, path: &Path) -> CoreResult<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Sets the memory backend.
    #[must_use]
    pub const fn memory_kind(mut self, kind: MemoryKind) -> Self {
        self.memory = kind;
        self
    }

    /// Sets the segment size.
    #[must_use]
    pub const fn segment_size(mut self, size: usize) -> Self {
        self.segment_size = size;
        self
    }

    /// Sets the batch size.
    #[must_use]
    pub const fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Sets the chunk width of sorted maps.
    #[must_use]
    pub const fn chunk_shift(mut self, shift: u32) -> Self {
        self.chunk_shift = shift;
        self
    }

    /// Sets the cache directory.
    #[must_use]
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Returns the path used by the structure `name`.
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(name)
    }

    /// Opens the memory of the structure `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory cannot be created.
    pub fn memory(&self, name: &str) -> CoreResult<Memory> {
        Ok(self.memory.open(&self.path(name), self.segment_size)?)
    }

    /// Opens a fixed-size list named `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory cannot be created or the layout is invalid.
    pub fn fixed_list<D: DataType>(&self, name: &str, data_type: D) -> CoreResult<DataList<D>> {
        DataList::fixed(self.memory(name)?, data_type)
    }

    /// Opens a variable-size list named `name`, with its offsets in
    /// `<name>_offsets`.
    ///
    /// # Errors
    ///
    /// Returns an error if a memory cannot be created.
    pub fn variable_list<D: DataType>(&self, name: &str, data_type: D) -> CoreResult<DataList<D>> {
        let offsets = self.fixed_list(&format!("{name}_offsets"), LongDataType)?;
        DataList::variable(self.memory(name)?, offsets, data_type)
    }

    /// Opens a list named `name`, fixed-size when the codec allows it.
    ///
    /// # Errors
    ///
    /// Returns an error if a memory cannot be created or the layout is invalid.
    pub fn list<D: DataType>(&self, name: &str, data_type: D) -> CoreResult<DataList<D>> {
        if data_type.fixed_size().is_some() {
            self.fixed_list(name, data_type)
        } else {
            self.variable_list(name, data_type)
        }
    }

    /// Reopens a list named `name` that already holds `len` elements.
    ///
    /// Fixed-size lists are restored with [`DataList::with_len`]; a
    /// variable-size list restores its offsets and resumes after the last
    /// element.
    ///
    /// # Errors
    ///
    /// Returns an error if a memory cannot be opened or the last element
    /// cannot be read back.
    pub fn list_with_len<D: DataType>(
        &self,
        name: &str,
        data_type: D,
        len: u64,
    ) -> CoreResult<DataList<D>> {
        if data_type.fixed_size().is_some() {
            DataList::with_len(self.memory(name)?, data_type, len)
        } else {
            let offsets = DataList::with_len(self.memory(&format!("{name}_offsets"))?, LongDataType, len)?;
            DataList::variable(self.memory(name)?, offsets, data_type)
        }
    }

    /// Opens a dense map named `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory cannot be created or `data_type` is
    /// not fixed-size.
    pub fn dense_map<D: DataType>(&self, name: &str, data_type: D) -> CoreResult<DenseDataMap<D>> {
        DenseDataMap::new(self.fixed_list(name, data_type)?)
    }

    /// Opens a sorted map named `name`, stored as `<name>_chunks`,
    /// `<name>_keys` and `<name>_values`.
    ///
    /// # Errors
    ///
    /// Returns an error if a memory cannot be created.
    pub fn sorted_map<D: DataType>(&self, name: &str, data_type: D) -> CoreResult<SortedDataMap<D>> {
        SortedDataMap::with_chunk_shift(
            self.fixed_list(&format!("{name}_chunks"), LongDataType)?,
            self.fixed_list(&format!("{name}_keys"), LongDataType)?,
            self.list(&format!("{name}_values"), data_type)?,
            self.chunk_shift,
        )
    }

    /// Reopens a persisted sorted map named `name` with `chunks` chunk
    /// offsets and `entries` stored entries, as reported by
    /// [`SortedDataMap::chunk_count`] and [`SortedDataMap::entry_count`]
    /// before it was closed.
    ///
    /// # Errors
    ///
    /// Returns an error if a memory cannot be opened or the stored lists
    /// are inconsistent.
    pub fn reopen_sorted_map<D: DataType>(
        &self,
        name: &str,
        data_type: D,
        chunks: u64,
        entries: u64,
    ) -> CoreResult<SortedDataMap<D>> {
        SortedDataMap::with_chunk_shift(
            DataList::with_len(self.memory(&format!("{name}_chunks"))?, LongDataType, chunks)?,
            DataList::with_len(self.memory(&format!("{name}_keys"))?, LongDataType, entries)?,
            self.list_with_len(&format!("{name}_values"), data_type, entries)?,
            self.chunk_shift,
        )
    }

    /// Opens an indexed map whose values are stored as `<name>`.
    ///
    /// # Errors
    ///
    /// Returns an error if a memory cannot be created.
    pub fn indexed_map<D: DataType>(&self, name: &str, data_type: D) -> CoreResult<IndexedDataMap<D>> {
        Ok(IndexedDataMap::new(self.list(name, data_type)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::DataMap;
    use geostore_codec::{CoordinateDataType, LongListDataType};
    use tempfile::tempdir;

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.memory, MemoryKind::OffHeap);
        assert_eq!(config.segment_size, 1 << 20);
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.chunk_shift, 8);
    }

    #[test]
    fn builder_pattern() {
        let config = CacheConfig::new()
            .memory_kind(MemoryKind::MappedDirectory)
            .segment_size(4096)
            .batch_size(10)
            .cache_dir("/tmp/cache");

        assert_eq!(config.memory, MemoryKind::MappedDirectory);
        assert_eq!(config.segment_size, 4096);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.path("coordinates"), PathBuf::from("/tmp/cache/coordinates"));
    }

    #[test]
    fn json_round_trip_and_partial_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("geostore.json");

        let config = CacheConfig::new().memory_kind(MemoryKind::MappedFile);
        config.to_json_file(&path).unwrap();
        assert_eq!(CacheConfig::from_json_file(&path).unwrap(), config);

        fs::write(&path, r#"{ "memory": "on_heap", "segment_size": 512 }"#).unwrap();
        let partial = CacheConfig::from_json_file(&path).unwrap();
        assert_eq!(partial.memory, MemoryKind::OnHeap);
        assert_eq!(partial.segment_size, 512);
        assert_eq!(partial.batch_size, DEFAULT_BATCH_SIZE);

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            CacheConfig::from_json_file(&path),
            Err(crate::CoreError::Config(_))
        ));
    }

    #[test]
    fn named_structures_land_in_cache_dir() {
        let dir = tempdir().unwrap();
        let config = CacheConfig::new()
            .memory_kind(MemoryKind::MappedDirectory)
            .segment_size(1024)
            .cache_dir(dir.path());

        let mut coordinates = config.dense_map("coordinates", CoordinateDataType).unwrap();
        coordinates.put(0, &geostore_codec::Coordinate::new(1.0, 2.0)).unwrap();

        let mut references = config.sorted_map("references", LongListDataType::default()).unwrap();
        references.put(1, &vec![0]).unwrap();

        for name in ["coordinates", "references_chunks", "references_keys", "references_values", "references_values_offsets"] {
            assert!(dir.path().join(name).is_dir(), "{name}");
        }

        references.clean().unwrap();
        assert!(!dir.path().join("references_keys").exists());
        assert!(dir.path().join("coordinates").exists());
    }

    #[test]
    fn sorted_map_reopens_with_its_counts() {
        let dir = tempdir().unwrap();
        let config = CacheConfig::new()
            .memory_kind(MemoryKind::MappedFile)
            .segment_size(1024)
            .cache_dir(dir.path());

        let (chunks, entries) = {
            let mut ways = config.sorted_map("ways", LongListDataType::default()).unwrap();
            ways.put(3, &vec![1, 2]).unwrap();
            ways.put(3, &vec![4]).unwrap();
            ways.put(900, &vec![]).unwrap();
            ways.close().unwrap();
            (ways.chunk_count(), ways.entry_count())
        };

        let mut ways = config
            .reopen_sorted_map("ways", LongListDataType::default(), chunks, entries)
            .unwrap();
        assert_eq!(ways.len(), 2);
        assert_eq!(ways.get(3).unwrap(), Some(vec![4]));
        assert_eq!(ways.get(900).unwrap(), Some(vec![]));
        assert!(matches!(ways.put(5, &vec![5]), Err(crate::CoreError::UnsortedKey { .. })));
        ways.put(1_000, &vec![7]).unwrap();
        assert_eq!(ways.get(1_000).unwrap(), Some(vec![7]));
    }
}
