//! Codec round trips through variable-size lists on every backend.

use geostore_codec::{
    CoordinateArrayDataType, DataType, LongDataType, LongListDataType, MapDataType, StringDataType,
};
use geostore_core::DataMap;
use geostore_testkit::prelude::*;
use proptest::prelude::*;
use std::fmt::Debug;

const SEGMENT_SIZE: usize = 4096;

/// Appends `values` to a fresh variable-size list of every kind and reads them back.
fn round_trip<D>(data_type: D, values: &[D::Value]) -> Result<(), TestCaseError>
where
    D: DataType + Clone,
    D::Value: PartialEq + Debug,
{
    let fixture = TestMemory::new();
    for kind in ALL_KINDS {
        let name = format!("{kind:?}");
        let mut list = fixture.variable_list(kind, &name, SEGMENT_SIZE, data_type.clone());
        for (i, value) in values.iter().enumerate() {
            prop_assert_eq!(list.add(value).unwrap(), i as u64);
        }
        prop_assert_eq!(list.len(), values.len() as u64);
        for (i, value) in values.iter().enumerate() {
            prop_assert_eq!(&list.get(i as u64).unwrap(), value, "{:?}", kind);
        }
        list.clean().unwrap();
    }
    Ok(())
}

#[test]
fn coordinate_arrays_of_every_length() {
    let way = |n: usize| {
        (0..n)
            .map(|i| geostore_codec::Coordinate::new(i as f64 * 0.5, -(i as f64)))
            .collect::<Vec<_>>()
    };
    round_trip(CoordinateArrayDataType::default(), &[way(0), way(1), way(64)]).unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn coordinate_arrays(values in prop::collection::vec(coordinate_array_strategy(), 0..16)) {
        round_trip(CoordinateArrayDataType::default(), &values)?;
    }

    #[test]
    fn references(values in prop::collection::vec(references_strategy(), 0..32)) {
        round_trip(LongListDataType::default(), &values)?;
    }

    #[test]
    fn text(values in prop::collection::vec(text_strategy(), 0..32)) {
        round_trip(StringDataType, &values)?;
    }

    #[test]
    fn tags(values in prop::collection::vec(tags_strategy(), 0..16)) {
        round_trip(MapDataType::new(StringDataType, StringDataType), &values)?;
    }

    #[test]
    fn dense_map_keeps_every_written_node(ids in prop::collection::vec(node_id_strategy(10_000), 1..64)) {
        let fixture = TestMemory::new();
        let mut map = fixture.dense_map(geostore_storage::MemoryKind::OffHeap, "nodes", SEGMENT_SIZE, LongDataType);
        for id in &ids {
            map.put(*id, &(id + 1)).unwrap();
        }
        for id in &ids {
            prop_assert_eq!(map.get(*id).unwrap(), Some(id + 1));
        }
        let high = ids.iter().max().copied().unwrap_or(0);
        prop_assert_eq!(map.len(), high as u64 + 1);
        prop_assert_eq!(map.get(high + 1).unwrap(), None);
    }

    #[test]
    fn sorted_map_returns_the_last_duplicate(keys in sorted_keys_strategy(2_000, 128)) {
        let fixture = TestMemory::new();
        let mut map = fixture.sorted_map(geostore_storage::MemoryKind::OnHeap, "nodes", SEGMENT_SIZE, LongDataType);
        for (i, key) in keys.iter().enumerate() {
            map.put(*key, &(i as i64)).unwrap();
        }
        for key in &keys {
            let last = keys.iter().rposition(|k| k == key).unwrap();
            prop_assert_eq!(map.get(*key).unwrap(), Some(last as i64));
        }
        let mut distinct = keys.clone();
        distinct.dedup();
        prop_assert_eq!(map.len(), distinct.len() as u64);
    }
}
