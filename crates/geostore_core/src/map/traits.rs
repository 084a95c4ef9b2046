//! The map contract shared by every strategy.

use crate::error::{CoreError, CoreResult};

/// A map from `i64` keys to values of type `V`.
///
/// Writers need `&mut self`; readers share `&self` and may call
/// [`DataMap::get`] and [`DataMap::get_all`] from many threads.
///
/// A missing key is `Ok(None)`, never an error.
pub trait DataMap<V>: Send + Sync {
    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is rejected by the strategy or the value
    /// cannot be written.
    fn put(&mut self, key: i64, value: &V) -> CoreResult<()>;

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a storage or codec error if the value cannot be read.
    fn get(&self, key: i64) -> CoreResult<Option<V>>;

    /// Returns the values of `keys`, in the same order.
    ///
    /// # Errors
    ///
    /// Fails on the first read error.
    fn get_all(&self, keys: &[i64]) -> CoreResult<Vec<Option<V>>> {
        keys.iter().map(|key| self.get(*key)).collect()
    }

    /// Stores every entry, in order.
    ///
    /// # Errors
    ///
    /// Fails on the first rejected entry; earlier entries stay written.
    fn put_all(&mut self, entries: &[(i64, V)]) -> CoreResult<()> {
        for (key, value) in entries {
            self.put(*key, value)?;
        }
        Ok(())
    }

    /// Returns whether a value is stored under `key`.
    ///
    /// # Errors
    ///
    /// Same as [`DataMap::get`].
    fn contains_key(&self, key: i64) -> CoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Removes `key`, returning whether it was present.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Unsupported`] unless the strategy supports deletion.
    fn delete(&mut self, key: i64) -> CoreResult<bool> {
        let _ = key;
        Err(CoreError::unsupported("delete", std::any::type_name::<Self>()))
    }

    /// Returns the number of entries. See each strategy for what is counted.
    fn len(&self) -> u64;

    /// Returns whether the map is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Closes every list and memory beneath the map, keeping persisted data.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing mapped memory fails.
    fn close(&self) -> CoreResult<()>;

    /// Closes the map and deletes everything it persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if a backing file or directory cannot be removed.
    fn clean(&self) -> CoreResult<()>;
}
