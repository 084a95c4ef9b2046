//! Cross-backend memory behavior.

use geostore_codec::{LongDataType, StringDataType};
use geostore_core::DataList;
use geostore_storage::{MemoryKind, StorageError};
use geostore_testkit::prelude::*;
use std::sync::Arc;

#[test]
fn segments_are_stable_and_sized() {
    with_each_memory(512, |memory| {
        let first = memory.segment(3).unwrap();
        let again = memory.segment(3).unwrap();
        assert!(Arc::ptr_eq(&first, &again), "{:?}", memory.kind());
        assert_eq!(first.capacity(), 512);
        assert_eq!(first.index(), 3);
        assert!(memory.segment_count() >= 4);
    });
}

#[test]
fn closed_memories_refuse_segments() {
    with_each_memory(128, |memory| {
        memory.segment(0).unwrap();
        memory.close().unwrap();
        assert!(memory.is_closed());
        assert!(matches!(memory.segment(0), Err(StorageError::Closed)));
    });
}

#[test]
fn mapped_lists_survive_reopen() {
    let fixture = TestMemory::new();
    for kind in [MemoryKind::MappedFile, MemoryKind::MappedDirectory] {
        let name = format!("{kind:?}");
        {
            let mut list = fixture.fixed_list(kind, &name, 256, LongDataType);
            for value in 0..100i64 {
                list.add(&(value * 3)).unwrap();
            }
            list.close().unwrap();
        }

        let memory = fixture.memory(kind, &name, 256);
        let list = DataList::with_len(memory, LongDataType, 100).unwrap();
        assert_eq!(list.get(0).unwrap(), 0);
        assert_eq!(list.get(99).unwrap(), 297);
    }
}

#[test]
fn variable_lists_resume_after_reopen() {
    let fixture = TestMemory::new();
    let kind = MemoryKind::MappedDirectory;
    {
        let mut list = fixture.variable_list(kind, "names", 256, StringDataType);
        list.add(&"Bern".to_string()).unwrap();
        list.add(&"Zürich".to_string()).unwrap();
        list.close().unwrap();
    }

    let offsets = DataList::with_len(fixture.memory(kind, "names_offsets", 256), LongDataType, 2).unwrap();
    let mut list = DataList::variable(fixture.memory(kind, "names", 256), offsets, StringDataType).unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list.add(&"Genève".to_string()).unwrap(), 2);
    let names: Vec<_> = list.iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(names, ["Bern", "Zürich", "Genève"]);
}

#[test]
fn clean_removes_persisted_state() {
    let fixture = TestMemory::new();
    for memory in fixture.all(64) {
        memory.segment(1).unwrap();
        let path = memory.path().map(|p| p.to_path_buf());
        if let Some(path) = &path {
            assert!(path.exists());
        }
        memory.clean().unwrap();
        if let Some(path) = &path {
            assert!(!path.exists(), "{:?} left {}", memory.kind(), path.display());
        }
    }
}
