//! Benchmark utilities.

#![warn(missing_docs)]

use geostore_codec::Coordinate;
use rand::Rng;

/// Generate a random WGS84 coordinate.
pub fn random_coordinate<R: Rng>(rng: &mut R) -> Coordinate {
    Coordinate::new(rng.gen_range(-180.0..=180.0), rng.gen_range(-90.0..=90.0))
}

/// Generate `count` nodes with ascending ids spaced by at most `max_gap`.
pub fn generate_nodes(count: usize, max_gap: i64) -> Vec<(i64, Coordinate)> {
    let mut rng = rand::thread_rng();
    let mut id = 0;
    (0..count)
        .map(|_| {
            id += rng.gen_range(1..=max_gap.max(1));
            (id, random_coordinate(&mut rng))
        })
        .collect()
}

/// Pick `count` ids out of `nodes`, in random order.
pub fn sample_ids(nodes: &[(i64, Coordinate)], count: usize) -> Vec<i64> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| nodes[rng.gen_range(0..nodes.len())].0)
        .collect()
}
