//! Append-ordered map with a chunked offset index.

use super::DataMap;
use crate::error::{CoreError, CoreResult};
use crate::list::DataList;
use geostore_codec::{DataType, LongDataType};
use std::collections::HashSet;
use tracing::debug;

/// Default bucket width: keys sharing `key >> 8` share a chunk.
pub const DEFAULT_CHUNK_SHIFT: u32 = 8;

/// A map whose keys arrive in ascending order.
///
/// Keys and values are appended to parallel lists. A third list holds, for
/// each chunk `key >> chunk_shift`, the index of the first key of that chunk,
/// so a lookup binary-searches only the keys of one chunk.
///
/// # Write order
///
/// `put` rejects a key smaller than the previous one with
/// [`CoreError::UnsortedKey`]. Repeating the previous key appends a duplicate;
/// lookups return the value inserted last.
///
/// # Deletion
///
/// Deleted keys are remembered in an in-heap set and hidden from lookups.
/// Putting a deleted key again revives it with the new value.
#[derive(Debug)]
pub struct SortedDataMap<D: DataType> {
    offsets: DataList<LongDataType>,
    keys: DataList<LongDataType>,
    values: DataList<D>,
    chunk_shift: u32,
    last_key: Option<i64>,
    live: u64,
    tombstones: HashSet<i64>,
}

impl<D: DataType> SortedDataMap<D> {
    /// Creates a map with the default chunk width.
    ///
    /// # Errors
    ///
    /// See [`SortedDataMap::with_chunk_shift`].
    pub fn new(
        offsets: DataList<LongDataType>,
        keys: DataList<LongDataType>,
        values: DataList<D>,
    ) -> CoreResult<Self> {
        Self::with_chunk_shift(offsets, keys, values, DEFAULT_CHUNK_SHIFT)
    }

    /// Creates a map whose chunks span `1 << chunk_shift` keys.
    ///
    /// Non-empty lists are resumed: the next key must not be smaller than
    /// the last stored one.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidLayout`] if `chunk_shift` is 64 or more,
    /// or if `keys` and `values` have different lengths.
    pub fn with_chunk_shift(
        offsets: DataList<LongDataType>,
        keys: DataList<LongDataType>,
        values: DataList<D>,
        chunk_shift: u32,
    ) -> CoreResult<Self> {
        if chunk_shift >= 64 {
            return Err(CoreError::invalid_layout(format!(
                "chunk shift {chunk_shift} exceeds the key width"
            )));
        }
        if keys.len() != values.len() {
            return Err(CoreError::invalid_layout(format!(
                "{} keys for {} values",
                keys.len(),
                values.len()
            )));
        }

        let mut last_key = None;
        let mut live = 0;
        for key in keys.iter() {
            let key = key?;
            if last_key != Some(key) {
                live += 1;
            }
            last_key = Some(key);
        }
        if live > 0 {
            debug!(entries = keys.len(), live, "resumed sorted map");
        }

        Ok(Self {
            offsets,
            keys,
            values,
            chunk_shift,
            last_key,
            live,
            tombstones: HashSet::new(),
        })
    }

    /// Returns the configured chunk shift.
    #[must_use]
    pub fn chunk_shift(&self) -> u32 {
        self.chunk_shift
    }

    /// Returns the number of chunks covered by the offset index.
    #[must_use]
    pub fn chunk_count(&self) -> u64 {
        self.offsets.len()
    }

    /// Returns the number of stored entries, duplicates and deleted keys included.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.keys.len()
    }

    fn append_key(&mut self, key: i64, chunk: u64, first: i64) -> CoreResult<()> {
        while self.offsets.len() <= chunk {
            self.offsets.add(&first)?;
        }
        self.keys.add(&key)?;
        Ok(())
    }

    fn chunk(&self, key: i64) -> u64 {
        (key as u64) >> self.chunk_shift
    }

    /// Returns the position of the last entry for `key`, if any.
    fn find(&self, key: i64) -> CoreResult<Option<u64>> {
        if key < 0 {
            return Ok(None);
        }
        let chunk = self.chunk(key);
        if chunk >= self.offsets.len() {
            return Ok(None);
        }
        let mut lo = offset(self.offsets.get(chunk)?)?;
        let end = if chunk + 1 < self.offsets.len() {
            offset(self.offsets.get(chunk + 1)?)?
        } else {
            self.keys.len()
        };

        // upper bound: first position in [lo, end) holding a larger key
        let start = lo;
        let mut hi = end;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.keys.get(mid)? <= key {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo > start && self.keys.get(lo - 1)? == key {
            Ok(Some(lo - 1))
        } else {
            Ok(None)
        }
    }
}

impl<D: DataType> DataMap<D::Value> for SortedDataMap<D> {
    fn put(&mut self, key: i64, value: &D::Value) -> CoreResult<()> {
        if key < 0 {
            return Err(CoreError::InvalidKey {
                key,
                reason: "sorted maps chunk non-negative keys",
            });
        }
        if let Some(last) = self.last_key {
            if key < last {
                return Err(CoreError::UnsortedKey { key, last });
            }
        }

        let chunk = self.chunk(key);
        let entries = self.keys.len();
        let chunks = self.offsets.len();
        let first = i64::try_from(entries)
            .map_err(|_| CoreError::invalid_layout("key count exceeds i64"))?;

        // values first: a rejected value changes nothing
        self.values.add(value)?;
        if let Err(e) = self.append_key(key, chunk, first) {
            self.offsets.truncate(chunks)?;
            self.keys.truncate(entries)?;
            self.values.truncate(entries)?;
            return Err(e);
        }

        if self.tombstones.remove(&key) || self.last_key != Some(key) {
            self.live += 1;
        }
        self.last_key = Some(key);
        Ok(())
    }

    fn get(&self, key: i64) -> CoreResult<Option<D::Value>> {
        if self.tombstones.contains(&key) {
            return Ok(None);
        }
        match self.find(key)? {
            Some(position) => self.values.get(position).map(Some),
            None => Ok(None),
        }
    }

    fn contains_key(&self, key: i64) -> CoreResult<bool> {
        Ok(!self.tombstones.contains(&key) && self.find(key)?.is_some())
    }

    fn delete(&mut self, key: i64) -> CoreResult<bool> {
        if !self.contains_key(key)? {
            return Ok(false);
        }
        self.tombstones.insert(key);
        self.live -= 1;
        Ok(true)
    }

    /// The number of distinct live keys.
    fn len(&self) -> u64 {
        self.live
    }

    fn close(&self) -> CoreResult<()> {
        self.offsets.close()?;
        self.keys.close()?;
        self.values.close()
    }

    fn clean(&self) -> CoreResult<()> {
        self.offsets.clean()?;
        self.keys.clean()?;
        self.values.clean()
    }
}

/// Offsets are written from list lengths; a negative one means corruption.
fn offset(stored: i64) -> CoreResult<u64> {
    u64::try_from(stored)
        .map_err(|_| CoreError::invalid_layout(format!("negative chunk offset {stored}")))
}
