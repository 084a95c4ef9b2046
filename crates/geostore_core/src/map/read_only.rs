//! Immutable view over a map.

use super::DataMap;
use crate::error::{CoreError, CoreResult};
use std::marker::PhantomData;

/// Wraps a populated map for the read phase of an import.
///
/// Reads are forwarded; `put`, `put_all` and `delete` fail with
/// [`CoreError::Unsupported`].
#[derive(Debug)]
pub struct ReadOnlyDataMap<V, M> {
    inner: M,
    _value: PhantomData<fn() -> V>,
}

impl<V, M: DataMap<V>> ReadOnlyDataMap<V, M> {
    /// Freezes `inner`.
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            _value: PhantomData,
        }
    }

    /// Returns the wrapped map, making it writable again.
    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<V, M: DataMap<V>> DataMap<V> for ReadOnlyDataMap<V, M> {
    fn put(&mut self, _key: i64, _value: &V) -> CoreResult<()> {
        Err(CoreError::unsupported("put", "ReadOnlyDataMap"))
    }

    fn put_all(&mut self, _entries: &[(i64, V)]) -> CoreResult<()> {
        Err(CoreError::unsupported("put_all", "ReadOnlyDataMap"))
    }

    fn delete(&mut self, _key: i64) -> CoreResult<bool> {
        Err(CoreError::unsupported("delete", "ReadOnlyDataMap"))
    }

    fn get(&self, key: i64) -> CoreResult<Option<V>> {
        self.inner.get(key)
    }

    fn get_all(&self, keys: &[i64]) -> CoreResult<Vec<Option<V>>> {
        self.inner.get_all(keys)
    }

    fn contains_key(&self, key: i64) -> CoreResult<bool> {
        self.inner.contains_key(key)
    }

    fn len(&self) -> u64 {
        self.inner.len()
    }

    fn close(&self) -> CoreResult<()> {
        self.inner.close()
    }

    fn clean(&self) -> CoreResult<()> {
        self.inner.clean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::DataList;
    use crate::map::DenseDataMap;
    use geostore_codec::LongDataType;
    use geostore_storage::Memory;

    #[test]
    fn reads_forward_and_writes_fail() {
        let list = DataList::fixed(Memory::on_heap(64).unwrap(), LongDataType).unwrap();
        let mut dense = DenseDataMap::new(list).unwrap();
        dense.put(3, &33).unwrap();

        let mut map = ReadOnlyDataMap::new(dense);
        assert_eq!(map.get(3).unwrap(), Some(33));
        assert_eq!(map.get_all(&[3, 9]).unwrap(), vec![Some(33), None]);
        assert_eq!(map.len(), 4);

        assert!(matches!(map.put(4, &44), Err(CoreError::Unsupported { operation: "put", .. })));
        assert!(map.put_all(&[(5, 55)]).is_err());
        assert!(map.delete(3).is_err());

        let mut dense = map.into_inner();
        dense.put(4, &44).unwrap();
        assert_eq!(dense.get(4).unwrap(), Some(44));
    }
}
