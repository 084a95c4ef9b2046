//! # geostore core
//!
//! Lists, maps and ingestion helpers for the coordinate and reference caches
//! of an OSM import.
//!
//! This crate provides:
//! - [`DataList`]: append-only random-access lists of fixed- or variable-size
//!   values over a [`geostore_storage::Memory`]
//! - [`DataMap`] and its strategies: [`DenseDataMap`], [`SortedDataMap`],
//!   [`IndexedDataMap`], [`HashDataMap`] and [`ReadOnlyDataMap`]
//! - [`BatchWriter`], [`import_entries`] and [`resolve_references`] for the
//!   write-then-read life cycle of a cache
//! - [`CacheConfig`] to name and open the structures of a cache
//!
//! ## Example
//!
//! ```
//! use geostore_codec::{Coordinate, CoordinateDataType};
//! use geostore_core::{CacheConfig, DataMap, ImportStats};
//! use geostore_storage::MemoryKind;
//!
//! let config = CacheConfig::new().memory_kind(MemoryKind::OnHeap).segment_size(4096);
//! let mut nodes = config.dense_map("coordinates", CoordinateDataType)?;
//! nodes.put(1, &Coordinate::new(7.44, 46.95))?;
//! nodes.put(2, &Coordinate::new(7.45, 46.96))?;
//!
//! let stats = ImportStats::new();
//! let way = geostore_core::resolve_references(&nodes, &[2, 1], &stats)?;
//! assert_eq!(way.map(|w| w.len()), Some(2));
//! # Ok::<(), geostore_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod list;
pub mod map;
mod stats;

pub use cache::{import_entries, resolve_references, BatchWriter};
pub use config::{CacheConfig, DEFAULT_BATCH_SIZE};
pub use error::{CoreError, CoreResult};
pub use list::DataList;
pub use map::{
    DataMap, DenseDataMap, HashDataMap, IndexedDataMap, ReadOnlyDataMap, SortedDataMap,
    DEFAULT_CHUNK_SHIFT,
};
pub use stats::{ImportSnapshot, ImportStats};
