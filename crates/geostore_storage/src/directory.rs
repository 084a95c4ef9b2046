//! Memory backed by a directory of memory-mapped segment files.

use crate::error::{StorageError, StorageResult};
use crate::memory::SegmentTable;
use crate::segment::Segment;
use memmap2::MmapOptions;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A memory whose segments are independent files inside a directory.
///
/// Segment `i` is the file `<directory>/<i>`, exactly `segment_size` bytes
/// long. Unlike [`crate::MappedFileMemory`], sparse segment indices do not
/// create holes in a shared file.
#[derive(Debug)]
pub struct MappedDirectoryMemory {
    path: PathBuf,
    table: SegmentTable,
}

impl MappedDirectoryMemory {
    /// Opens or creates the directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `segment_size` is zero or the directory cannot be created.
    pub fn open(path: &Path, segment_size: usize) -> StorageResult<Self> {
        let table = SegmentTable::new(segment_size)?;
        fs::create_dir_all(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            table,
        })
    }

    /// Returns the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the file holding segment `index`.
    #[must_use]
    pub fn segment_path(&self, index: u32) -> PathBuf {
        self.path.join(index.to_string())
    }

    /// Returns the segment at `index`, creating and mapping its file if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory is closed or the file cannot be created
    /// or mapped.
    pub fn segment(&self, index: u32) -> StorageResult<Arc<Segment>> {
        self.table.get_or_allocate(index, |index| self.map_segment(index))
    }

    fn map_segment(&self, index: u32) -> StorageResult<Segment> {
        let size = self.table.segment_size();
        let path = self.segment_path(index);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        if file.metadata()?.len() < size as u64 {
            file.set_len(size as u64)?;
            debug!(path = %path.display(), size, "created segment file");
        }

        #[allow(unsafe_code)]
        // SAFETY: each segment file is mapped exactly once by this memory and
        // the directory is exclusively owned by the pipeline run.
        let map = unsafe { MmapOptions::new().len(size).map_mut(&file)? };
        Ok(Segment::mapped(index, map))
    }

    /// Returns the indices of the segment files present on disk, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn persisted_segments(&self) -> StorageResult<Vec<u32>> {
        let mut indices = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            if let Some(index) = entry.file_name().to_str().and_then(|n| n.parse().ok()) {
                indices.push(index);
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }

    /// The persisted extent runs up to the end of the highest segment file.
    pub(crate) fn allocated_bytes(&self) -> u64 {
        self.persisted_segments()
            .ok()
            .and_then(|indices| indices.last().copied())
            .map_or(0, |last| (u64::from(last) + 1) * self.table.segment_size() as u64)
    }

    pub(crate) fn clean(&self) -> StorageResult<()> {
        self.table.release(false)?;
        match fs::remove_dir_all(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed segment directory");
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
