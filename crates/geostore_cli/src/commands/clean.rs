//! Clean command implementation.

use crate::manifest::{CacheManifest, CliResult, COORDINATES, MANIFEST_FILE};
use std::fs;
use std::path::Path;
use tracing::info;

/// Deletes the coordinate map and the manifest of the cache at `path`.
pub fn run(path: &Path) -> CliResult<()> {
    let manifest = CacheManifest::read(path)?;
    manifest.config.memory(COORDINATES)?.clean()?;
    fs::remove_file(path.join(MANIFEST_FILE))?;
    info!(path = %path.display(), "cleaned cache");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::load;
    use crate::manifest::CliError;
    use geostore_core::CacheConfig;
    use geostore_storage::MemoryKind;
    use tempfile::tempdir;

    #[test]
    fn clean_removes_cache_files() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("nodes.txt");
        fs::write(&input, "1 1.0 1.0\n").unwrap();

        let cache = dir.path().join("cache");
        let config = CacheConfig::new()
            .memory_kind(MemoryKind::MappedFile)
            .segment_size(1024)
            .cache_dir(&cache);
        load::run(&config, &input).unwrap();
        assert!(cache.join(COORDINATES).exists());

        run(&cache).unwrap();
        assert!(!cache.join(COORDINATES).exists());
        assert!(!cache.join(MANIFEST_FILE).exists());
        assert!(matches!(run(&cache), Err(CliError::NotFound(_))));
    }

    #[test]
    fn clean_targets_a_moved_cache() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("nodes.txt");
        fs::write(&input, "2 1.0 1.0\n").unwrap();

        let cache = dir.path().join("cache");
        let config = CacheConfig::new()
            .memory_kind(MemoryKind::MappedDirectory)
            .segment_size(1024)
            .cache_dir(&cache);
        load::run(&config, &input).unwrap();

        let moved = dir.path().join("moved");
        fs::rename(&cache, &moved).unwrap();
        run(&moved).unwrap();
        assert!(!moved.join(COORDINATES).exists());
        assert!(!cache.exists());
    }
}
