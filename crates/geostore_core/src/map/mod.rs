//! Key-value maps over `i64` keys.
//!
//! A map stores its keys and values in [`crate::DataList`]s and owns them:
//! closing a map closes every list and memory beneath it.
//!
//! # Map Types
//!
//! - [`DenseDataMap`]: the key is the list index, O(1) lookup, for densely
//!   numbered keys such as OSM node ids
//! - [`SortedDataMap`]: keys appended in ascending order and found by binary
//!   search inside a `key >> chunk_shift` bucket
//! - [`IndexedDataMap`]: an in-heap hash index over a value log, for keys in
//!   arbitrary order
//! - [`HashDataMap`]: a fixed-capacity open-addressing table kept entirely
//!   in memory segments
//! - [`ReadOnlyDataMap`]: a view rejecting mutation

mod dense;
mod hash;
mod indexed;
mod read_only;
mod sorted;
mod traits;

pub use dense::DenseDataMap;
pub use hash::{HashDataMap, EMPTY_KEY, TOMBSTONE_KEY};
pub use indexed::IndexedDataMap;
pub use read_only::ReadOnlyDataMap;
pub use sorted::{SortedDataMap, DEFAULT_CHUNK_SHIFT};
pub use traits::DataMap;
