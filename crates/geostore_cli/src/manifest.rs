//! The manifest written next to a loaded cache.

use geostore_codec::CoordinateDataType;
use geostore_core::{CacheConfig, DataList, DenseDataMap, ImportSnapshot};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the manifest inside the cache directory.
pub const MANIFEST_FILE: &str = "geostore.json";

/// Name of the coordinate map inside the cache directory.
pub const COORDINATES: &str = "coordinates";

/// Errors of the CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Library error.
    #[error(transparent)]
    Core(#[from] geostore_core::CoreError),

    /// Memory backend error.
    #[error(transparent)]
    Storage(#[from] geostore_storage::StorageError),

    /// Reading the input or writing the manifest failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed manifest.
    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Malformed input line.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What is wrong with the line.
        message: String,
    },

    /// No cache at the given path.
    #[error("no geostore cache found at {}", .0.display())]
    NotFound(PathBuf),
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// What `load` recorded about a cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheManifest {
    /// Configuration the cache was written with.
    pub config: CacheConfig,
    /// High-water mark of the coordinate map.
    pub coordinates: u64,
    /// Counters of the load.
    pub stats: ImportSnapshot,
}

impl CacheManifest {
    /// Reads the manifest of the cache at `dir`.
    ///
    /// The recorded cache directory is replaced by `dir`, so a cache that was
    /// moved, or loaded through a relative path, opens where it now lives.
    pub fn read(dir: &Path) -> CliResult<Self> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Err(CliError::NotFound(dir.to_path_buf()));
        }
        let mut manifest: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        manifest.config = manifest.config.cache_dir(dir);
        Ok(manifest)
    }

    /// Writes the manifest into its cache directory.
    pub fn write(&self) -> CliResult<()> {
        fs::create_dir_all(&self.config.cache_dir)?;
        let path = self.config.cache_dir.join(MANIFEST_FILE);
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reopens the coordinate map with its recorded length.
    pub fn open_coordinates(&self) -> CliResult<DenseDataMap<CoordinateDataType>> {
        let memory = self.config.memory(COORDINATES)?;
        let list = DataList::with_len(memory, CoordinateDataType, self.coordinates)?;
        Ok(DenseDataMap::new(list)?)
    }
}
