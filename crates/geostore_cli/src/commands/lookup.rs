//! Lookup command implementation.

use crate::manifest::{CacheManifest, CliResult};
use geostore_codec::Coordinate;
use geostore_core::DataMap;
use serde::Serialize;
use std::path::Path;

/// One looked-up node.
#[derive(Debug, PartialEq, Serialize)]
pub struct LookupEntry {
    /// Node id.
    pub id: i64,
    /// Its coordinate, if cached.
    pub coordinate: Option<Coordinate>,
}

/// Looks up `ids` in the coordinate map of the cache at `path`.
pub fn run(path: &Path, ids: &[i64]) -> CliResult<Vec<LookupEntry>> {
    let manifest = CacheManifest::read(path)?;
    let map = manifest.open_coordinates()?;
    let coordinates = map.get_all(ids)?;
    map.close()?;

    Ok(ids
        .iter()
        .zip(coordinates)
        .map(|(id, coordinate)| LookupEntry {
            id: *id,
            coordinate,
        })
        .collect())
}

/// Prints lookup results as text or JSON.
pub fn print(entries: &[LookupEntry], format: &str) -> CliResult<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(entries)?),
        _ => {
            for entry in entries {
                match entry.coordinate {
                    Some(c) => println!("{}\t{:.7}\t{:.7}", entry.id, c.lon, c.lat),
                    None => println!("{}\tmissing", entry.id),
                }
            }
        }
    }
    Ok(())
}
