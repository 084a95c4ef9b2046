//! Key-as-index map.

use super::DataMap;
use crate::error::{CoreError, CoreResult};
use crate::list::DataList;
use geostore_codec::DataType;

/// A map storing the value of key `k` at index `k` of a fixed-size list.
///
/// Lookups are O(1) and the map carries no key storage, which suits keys
/// that are dense non-negative integers. Keys that were never written but lie
/// below the highest written key decode as the zero value of the codec
/// (all-zero bytes); keys at or beyond it are absent.
///
/// Deletion is not supported.
#[derive(Debug)]
pub struct DenseDataMap<D: DataType> {
    values: DataList<D>,
}

impl<D: DataType> DenseDataMap<D> {
    /// Creates a map over a fixed-size list.
    ///
    /// The list length is the high-water mark, so a list restored with
    /// [`DataList::with_len`] restores the map.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidLayout`] for a variable-size list.
    pub fn new(values: DataList<D>) -> CoreResult<Self> {
        if values.offsets().is_some() {
            return Err(CoreError::invalid_layout(
                "a dense map needs fixed-size values",
            ));
        }
        Ok(Self { values })
    }

    /// Returns the underlying list.
    pub fn values(&self) -> &DataList<D> {
        &self.values
    }
}

impl<D: DataType> DataMap<D::Value> for DenseDataMap<D> {
    fn put(&mut self, key: i64, value: &D::Value) -> CoreResult<()> {
        let index = u64::try_from(key).map_err(|_| CoreError::InvalidKey {
            key,
            reason: "dense maps index by non-negative keys",
        })?;
        self.values.set(index, value)
    }

    fn get(&self, key: i64) -> CoreResult<Option<D::Value>> {
        match u64::try_from(key) {
            Ok(index) if index < self.values.len() => self.values.get(index).map(Some),
            _ => Ok(None),
        }
    }

    /// The high-water mark: one more than the highest key written.
    fn len(&self) -> u64 {
        self.values.len()
    }

    fn close(&self) -> CoreResult<()> {
        self.values.close()
    }

    fn clean(&self) -> CoreResult<()> {
        self.values.clean()
    }
}
