//! Inspect command implementation.

use crate::manifest::{CacheManifest, CliResult, COORDINATES};
use geostore_core::ImportSnapshot;
use geostore_storage::MemoryKind;
use serde::Serialize;
use std::path::Path;

/// Cache inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Cache directory.
    pub path: String,
    /// Memory backend.
    pub memory: MemoryKind,
    /// Segment size in bytes.
    pub segment_size: usize,
    /// Bytes persisted by the coordinate map.
    pub allocated_bytes: u64,
    /// High-water mark of the coordinate map.
    pub coordinates: u64,
    /// Counters recorded by the load.
    pub stats: ImportSnapshot,
    /// Segment files on disk (directory backend only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<u32>>,
}

/// Runs the inspect command.
pub fn run(path: &Path, show_segments: bool) -> CliResult<InspectResult> {
    let manifest = CacheManifest::read(path)?;
    let memory = manifest.config.memory(COORDINATES)?;

    let segments = match &memory {
        geostore_storage::Memory::MappedDirectory(directory) if show_segments => {
            Some(directory.persisted_segments()?)
        }
        _ => None,
    };
    let result = InspectResult {
        path: path.display().to_string(),
        memory: memory.kind(),
        segment_size: memory.segment_size(),
        allocated_bytes: memory.allocated_bytes(),
        coordinates: manifest.coordinates,
        stats: manifest.stats,
        segments,
    };
    memory.close()?;
    Ok(result)
}

/// Prints the result as text or JSON.
pub fn print(result: &InspectResult, format: &str) -> CliResult<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("geostore cache inspection");
    println!("=========================");
    println!();
    println!("Path:   {}", result.path);
    println!("Memory: {:?}", result.memory);
    println!();
    println!("Storage:");
    println!("  Segment size:  {}", format_size(result.segment_size as u64));
    println!("  Allocated:     {}", format_size(result.allocated_bytes));
    println!();
    println!("Coordinates:");
    println!("  High-water mark: {}", result.coordinates);
    println!("  Entries loaded:  {}", result.stats.entries_written);
    println!("  Batches:         {}", result.stats.batches_flushed);

    if let Some(segments) = &result.segments {
        println!();
        println!("Segment files: {segments:?}");
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} bytes")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
