//! Property-based test generators using proptest.
//!
//! Provides strategies for generating OSM-like data that maintains the
//! preconditions of the maps (ascending keys, valid coordinates).

use geostore_codec::Coordinate;
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Strategy for WGS84 coordinates.
pub fn coordinate_strategy() -> impl Strategy<Value = Coordinate> {
    (-180.0f64..=180.0, -90.0f64..=90.0).prop_map(|(lon, lat)| Coordinate::new(lon, lat))
}

/// Strategy for coordinate arrays of 0, 1 or many points.
pub fn coordinate_array_strategy() -> impl Strategy<Value = Vec<Coordinate>> {
    prop_oneof![
        Just(Vec::new()),
        coordinate_strategy().prop_map(|c| vec![c]),
        prop::collection::vec(coordinate_strategy(), 2..64),
    ]
}

/// Strategy for node ids usable as dense map keys.
pub fn node_id_strategy(max: i64) -> impl Strategy<Value = i64> {
    0..max
}

/// Strategy for ascending, possibly repeated, non-negative keys.
pub fn sorted_keys_strategy(max: i64, len: usize) -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0..max, 0..len).prop_map(|mut keys| {
        keys.sort_unstable();
        keys
    })
}

/// Strategy for ascending, distinct, non-negative keys.
pub fn distinct_sorted_keys_strategy(max: i64, len: usize) -> impl Strategy<Value = Vec<i64>> {
    prop::collection::btree_set(0..max, 0..len).prop_map(|keys| keys.into_iter().collect())
}

/// Strategy for way node-reference lists.
pub fn references_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(any::<i64>(), 0..32)
}

/// Strategy for arbitrary unicode strings, including the empty string.
pub fn text_strategy() -> impl Strategy<Value = String> {
    ".{0,64}"
}

/// Strategy for OSM tag maps.
pub fn tags_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(
        prop::string::string_regex("[a-z:_]{1,16}").expect("Invalid regex"),
        ".{0,32}",
        0..8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn coordinates_are_in_range(c in coordinate_strategy()) {
            prop_assert!((-180.0..=180.0).contains(&c.lon));
            prop_assert!((-90.0..=90.0).contains(&c.lat));
        }

        #[test]
        fn sorted_keys_ascend(keys in sorted_keys_strategy(1_000, 50)) {
            prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        }

        #[test]
        fn distinct_keys_strictly_ascend(keys in distinct_sorted_keys_strategy(1_000, 50)) {
            prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
