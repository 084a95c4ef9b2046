//! Load command implementation.

use crate::manifest::{CacheManifest, CliError, CliResult, COORDINATES};
use geostore_codec::{Coordinate, CoordinateDataType};
use geostore_core::{BatchWriter, CacheConfig, DataMap, ImportStats};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// Loads `id lon lat` lines from `input` into the coordinate map of a cache.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn run(config: &CacheConfig, input: &Path) -> CliResult<CacheManifest> {
    if !config.memory.is_persistent() {
        warn!(memory = ?config.memory, "cache will not survive this process");
    }

    let map = Mutex::new(config.dense_map(COORDINATES, CoordinateDataType)?);
    let stats = ImportStats::new();
    let reader = BufReader::new(File::open(input)?);

    let mut writer = BatchWriter::with_batch_size(&map, &stats, config.batch_size);
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some((id, coordinate)) = parse_line(&line, number + 1)? {
            writer.add(id, coordinate)?;
        }
    }
    writer.finish()?;

    let map = map.into_inner();
    let manifest = CacheManifest {
        config: config.clone(),
        coordinates: map.len(),
        stats: stats.snapshot(),
    };
    map.close()?;
    if config.memory.is_persistent() {
        manifest.write()?;
    }

    info!(
        entries = manifest.stats.entries_written,
        batches = manifest.stats.batches_flushed,
        high_water = manifest.coordinates,
        "loaded coordinates"
    );
    Ok(manifest)
}

/// Parses one input line.
pub fn parse_line(line: &str, number: usize) -> CliResult<Option<(i64, Coordinate)>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let error = |message: String| CliError::Parse {
        line: number,
        message,
    };

    let fields: Vec<&str> = line.split_whitespace().collect();
    let [id, lon, lat] = fields[..] else {
        return Err(error(format!("expected 3 fields, found {}", fields.len())));
    };
    let id = id
        .parse()
        .map_err(|e| error(format!("invalid id {id:?}: {e}")))?;
    let lon = lon
        .parse()
        .map_err(|e| error(format!("invalid longitude {lon:?}: {e}")))?;
    let lat = lat
        .parse()
        .map_err(|e| error(format!("invalid latitude {lat:?}: {e}")))?;
    Ok(Some((id, Coordinate::new(lon, lat))))
}
