//! Memory backed by a single memory-mapped file.

use crate::error::{StorageError, StorageResult};
use crate::memory::SegmentTable;
use crate::segment::Segment;
use memmap2::MmapOptions;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A memory whose segments are views into one growing file.
///
/// Segment `i` maps the byte range `[i * segment_size, (i + 1) * segment_size)`.
/// The file is extended to the high-water mark of the highest segment
/// requested so far, so its size is always a multiple of the segment size.
///
/// # Durability
///
/// - `flush()` writes dirty pages of every mapped segment back to the file
/// - `close()` flushes and unmaps; the file stays on disk
/// - `clean()` closes and deletes the file
///
/// # Example
///
/// ```no_run
/// use geostore_storage::Memory;
/// use std::path::Path;
///
/// let memory = Memory::mapped_file(Path::new("coordinates.bin"), 1 << 20).unwrap();
/// memory.segment(0).unwrap().write(|bytes| bytes[0] = 1).unwrap();
/// memory.close().unwrap();
/// ```
#[derive(Debug)]
pub struct MappedFileMemory {
    path: PathBuf,
    file: File,
    table: SegmentTable,
}

impl MappedFileMemory {
    /// Opens or creates the file at `path`, creating parent directories if needed.
    ///
    /// An existing file is reused as is; its bytes become visible through the
    /// segments that cover them.
    ///
    /// # Errors
    ///
    /// Returns an error if `segment_size` is zero or the file cannot be opened.
    pub fn open(path: &Path, segment_size: usize) -> StorageResult<Self> {
        let table = SegmentTable::new(segment_size)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            table,
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the segment at `index`, growing the file and mapping it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory is closed, the file cannot grow, or the
    /// mapping fails.
    pub fn segment(&self, index: u32) -> StorageResult<Arc<Segment>> {
        self.table.get_or_allocate(index, |index| self.map_segment(index))
    }

    fn map_segment(&self, index: u32) -> StorageResult<Segment> {
        let size = self.table.segment_size();
        let offset = u64::from(index) * size as u64;
        let end = offset + size as u64;

        let len = self.file.metadata()?.len();
        if len < end {
            self.file.set_len(end)?;
            debug!(path = %self.path.display(), from = len, to = end, "grew mapped file");
        }

        #[allow(unsafe_code)]
        // SAFETY: the range belongs to exactly one segment of this memory and
        // is mapped once; the file is exclusively owned by the pipeline run.
        let map = unsafe {
            MmapOptions::new()
                .offset(offset)
                .len(size)
                .map_mut(&self.file)?
        };
        Ok(Segment::mapped(index, map))
    }

    pub(crate) fn allocated_bytes(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    pub(crate) fn clean(&self) -> StorageResult<()> {
        self.table.release(false)?;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed mapped file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Cleanup {
                path: self.path.clone(),
                source,
            }),
        }
    }

    pub(crate) fn table(&self) -> &SegmentTable {
        &self.table
    }
}
