//! Open-addressing hash table stored in memory segments.

use super::DataMap;
use crate::error::{CoreError, CoreResult};
use crate::list::DataList;
use geostore_codec::{DataType, LongDataType};
use geostore_storage::Memory;
use tracing::debug;

/// Key marking a slot that was never used.
pub const EMPTY_KEY: i64 = i64::MIN;

/// Key marking a slot whose entry was deleted.
pub const TOMBSTONE_KEY: i64 = i64::MIN + 1;

/// Fibonacci hashing multiplier (2^64 / golden ratio).
const GOLDEN_RATIO: u64 = 0x9E37_79B9_7F4A_7C15;

/// A fixed-capacity hash map with linear probing.
///
/// Keys and values live in two fixed-size lists of `capacity` slots, so the
/// whole table sits in (possibly off-heap or mapped) memory. [`EMPTY_KEY`]
/// and [`TOMBSTONE_KEY`] are reserved and cannot be stored.
#[derive(Debug)]
pub struct HashDataMap<D: DataType> {
    keys: DataList<LongDataType>,
    values: DataList<D>,
    capacity: u64,
    len: u64,
}

impl<D: DataType> HashDataMap<D> {
    /// Creates an empty table of `capacity` slots.
    ///
    /// Every key slot is initialised to [`EMPTY_KEY`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidLayout`] if `capacity` is zero or
    /// `data_type` is not fixed-size.
    pub fn new(keys: Memory, values: Memory, data_type: D, capacity: u64) -> CoreResult<Self> {
        if capacity == 0 {
            return Err(CoreError::invalid_layout("hash map capacity must be positive"));
        }
        let mut keys = DataList::fixed(keys, LongDataType)?;
        let values = DataList::fixed(values, data_type)?;
        for slot in 0..capacity {
            keys.set(slot, &EMPTY_KEY)?;
        }
        debug!(capacity, "initialised hash map");
        Ok(Self {
            keys,
            values,
            capacity,
            len: 0,
        })
    }

    /// Returns the number of slots.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    fn home(&self, key: i64) -> u64 {
        ((key as u64).wrapping_mul(GOLDEN_RATIO) >> 16) % self.capacity
    }

    /// Returns the slot holding `key`, if any.
    fn find(&self, key: i64) -> CoreResult<Option<u64>> {
        if key == EMPTY_KEY || key == TOMBSTONE_KEY {
            return Ok(None);
        }
        let home = self.home(key);
        for probe in 0..self.capacity {
            let slot = (home + probe) % self.capacity;
            match self.keys.get(slot)? {
                EMPTY_KEY => return Ok(None),
                stored if stored == key => return Ok(Some(slot)),
                _ => {}
            }
        }
        Ok(None)
    }
}

impl<D: DataType> DataMap<D::Value> for HashDataMap<D> {
    fn put(&mut self, key: i64, value: &D::Value) -> CoreResult<()> {
        if key == EMPTY_KEY || key == TOMBSTONE_KEY {
            return Err(CoreError::InvalidKey {
                key,
                reason: "reserved as a slot marker",
            });
        }

        let home = self.home(key);
        let mut free = None;
        for probe in 0..self.capacity {
            let slot = (home + probe) % self.capacity;
            match self.keys.get(slot)? {
                stored if stored == key => {
                    return self.values.set(slot, value);
                }
                EMPTY_KEY => {
                    free.get_or_insert(slot);
                    break;
                }
                TOMBSTONE_KEY => {
                    free.get_or_insert(slot);
                }
                _ => {}
            }
        }

        let slot = free.ok_or(CoreError::MapFull {
            capacity: self.capacity,
        })?;
        self.keys.set(slot, &key)?;
        self.values.set(slot, value)?;
        self.len += 1;
        Ok(())
    }

    fn get(&self, key: i64) -> CoreResult<Option<D::Value>> {
        match self.find(key)? {
            Some(slot) => self.values.get(slot).map(Some),
            None => Ok(None),
        }
    }

    fn contains_key(&self, key: i64) -> CoreResult<bool> {
        Ok(self.find(key)?.is_some())
    }

    fn delete(&mut self, key: i64) -> CoreResult<bool> {
        match self.find(key)? {
            Some(slot) => {
                self.keys.set(slot, &TOMBSTONE_KEY)?;
                self.len -= 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn len(&self) -> u64 {
        self.len
    }

    fn close(&self) -> CoreResult<()> {
        self.keys.close()?;
        self.values.close()
    }

    fn clean(&self) -> CoreResult<()> {
        self.keys.clean()?;
        self.values.clean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geostore_codec::{Coordinate, LonLatDataType};

    fn table(capacity: u64) -> HashDataMap<LongDataType> {
        HashDataMap::new(
            Memory::on_heap(256).unwrap(),
            Memory::on_heap(256).unwrap(),
            LongDataType,
            capacity,
        )
        .unwrap()
    }

    #[test]
    fn put_get_overwrite() {
        let mut map = table(64);
        for key in [-7i64, 0, 1, 1 << 40, i64::MAX] {
            map.put(key, &(key / 2)).unwrap();
        }
        assert_eq!(map.len(), 5);
        assert_eq!(map.get(1 << 40).unwrap(), Some(1 << 39));
        assert_eq!(map.get(-7).unwrap(), Some(-3));
        assert_eq!(map.get(2).unwrap(), None);

        map.put(0, &99).unwrap();
        assert_eq!(map.get(0).unwrap(), Some(99));
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn full_table_is_reported() {
        let mut map = table(4);
        for key in 0..4 {
            map.put(key, &key).unwrap();
        }
        assert!(matches!(
            map.put(4, &4),
            Err(CoreError::MapFull { capacity: 4 })
        ));
        // every key is still reachable through a full probe cycle
        for key in 0..4 {
            assert_eq!(map.get(key).unwrap(), Some(key));
        }
        assert_eq!(map.get(100).unwrap(), None);
    }

    #[test]
    fn tombstones_are_reused() {
        let mut map = table(4);
        for key in 0..4 {
            map.put(key, &key).unwrap();
        }
        assert!(map.delete(2).unwrap());
        assert!(!map.delete(2).unwrap());
        assert_eq!(map.get(2).unwrap(), None);
        assert_eq!(map.len(), 3);

        map.put(10, &10).unwrap();
        assert_eq!(map.get(10).unwrap(), Some(10));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn reserved_keys_are_rejected() {
        let mut map = table(8);
        assert!(matches!(
            map.put(EMPTY_KEY, &0),
            Err(CoreError::InvalidKey { .. })
        ));
        assert!(map.put(TOMBSTONE_KEY, &0).is_err());
        assert_eq!(map.get(EMPTY_KEY).unwrap(), None);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(HashDataMap::new(
            Memory::on_heap(64).unwrap(),
            Memory::on_heap(64).unwrap(),
            LongDataType,
            0
        )
        .is_err());
    }

    #[test]
    fn compact_coordinates() {
        let mut map = HashDataMap::new(
            Memory::off_heap(1024).unwrap(),
            Memory::off_heap(1024).unwrap(),
            LonLatDataType,
            128,
        )
        .unwrap();
        map.put(123_456_789, &Coordinate::new(8.5, 47.25)).unwrap();
        assert_eq!(
            map.get(123_456_789).unwrap(),
            Some(Coordinate::new(8.5, 47.25))
        );
    }
}
