//! Hash index over a value log.

use super::DataMap;
use crate::error::CoreResult;
use crate::list::DataList;
use geostore_codec::DataType;
use std::collections::HashMap;

/// A map appending values to a list and indexing their positions in an
/// in-heap `HashMap`.
///
/// Keys may arrive in any order. Overwriting a key appends a new value and
/// leaves the old one unreachable in the log.
#[derive(Debug)]
pub struct IndexedDataMap<D: DataType> {
    index: HashMap<i64, u64>,
    values: DataList<D>,
}

impl<D: DataType> IndexedDataMap<D> {
    /// Creates an empty map over `values`.
    #[must_use]
    pub fn new(values: DataList<D>) -> Self {
        Self {
            index: HashMap::new(),
            values,
        }
    }

    /// Returns the underlying value log.
    pub fn values(&self) -> &DataList<D> {
        &self.values
    }
}

impl<D: DataType> DataMap<D::Value> for IndexedDataMap<D> {
    fn put(&mut self, key: i64, value: &D::Value) -> CoreResult<()> {
        let position = self.values.add(value)?;
        self.index.insert(key, position);
        Ok(())
    }

    fn get(&self, key: i64) -> CoreResult<Option<D::Value>> {
        match self.index.get(&key) {
            Some(position) => self.values.get(*position).map(Some),
            None => Ok(None),
        }
    }

    fn contains_key(&self, key: i64) -> CoreResult<bool> {
        Ok(self.index.contains_key(&key))
    }

    fn delete(&mut self, key: i64) -> CoreResult<bool> {
        Ok(self.index.remove(&key).is_some())
    }

    fn len(&self) -> u64 {
        self.index.len() as u64
    }

    fn close(&self) -> CoreResult<()> {
        self.values.close()
    }

    fn clean(&self) -> CoreResult<()> {
        self.values.clean()
    }
}
