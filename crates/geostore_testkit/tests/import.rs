//! Batched ingestion and reference resolution across crates.

use geostore_codec::{Coordinate, CoordinateDataType};
use geostore_core::{import_entries, resolve_references, BatchWriter, DataMap, ImportStats};
use geostore_storage::MemoryKind;
use geostore_testkit::prelude::*;
use parking_lot::Mutex;

#[test]
fn batch_writer_then_resolve() {
    let fixture = TestMemory::new();
    let config = fixture.config(MemoryKind::MappedFile, 4096).batch_size(16);
    let map = Mutex::new(config.dense_map("coordinates", CoordinateDataType).unwrap());
    let stats = ImportStats::new();

    let mut writer = BatchWriter::with_batch_size(&map, &stats, config.batch_size);
    for id in 0..100 {
        writer.add(id, node_coordinate(id)).unwrap();
    }
    writer.finish().unwrap();
    assert_eq!(stats.entries_written(), 100);
    assert_eq!(stats.batches_flushed(), 7);

    let map = map.into_inner();
    let way = resolve_references(&map, &[5, 6, 99], &stats).unwrap().unwrap();
    assert_eq!(way, vec![node_coordinate(5), node_coordinate(6), node_coordinate(99)]);

    let broken = resolve_references(&map, &[5, 1_000], &stats).unwrap();
    assert!(broken.is_none());
    assert_eq!(stats.references_missing(), 1);
}

#[test]
fn import_into_sorted_map() {
    let fixture = TestMemory::new();
    let config = fixture.config(MemoryKind::MappedDirectory, 1024);
    let map = Mutex::new(config.sorted_map("nodes", CoordinateDataType).unwrap());
    let stats = ImportStats::new();
    let entries: Vec<(i64, Coordinate)> = (0..50).map(|i| (i * 1_000, node_coordinate(i))).collect();

    let written = import_entries(&map, entries.clone(), 8, &stats).unwrap();
    assert_eq!(written, 50);
    assert_eq!(stats.batches_flushed(), 7);

    let map = map.into_inner();
    assert_eq!(map.len(), 50);
    for (key, coordinate) in &entries {
        assert_eq!(map.get(*key).unwrap(), Some(*coordinate));
    }
    assert_eq!(map.get(999).unwrap(), None);
    map.clean().unwrap();
}

#[test]
fn out_of_order_import_is_reported() {
    let fixture = TestMemory::new();
    let map = Mutex::new(fixture.sorted_map(MemoryKind::OnHeap, "nodes", 1024, CoordinateDataType));
    let stats = ImportStats::new();
    let entries = [(5, node_coordinate(5)), (2, node_coordinate(2))];

    assert!(import_entries(&map, entries, 8, &stats).is_err());
    assert_eq!(stats.errors(), 1);
}
