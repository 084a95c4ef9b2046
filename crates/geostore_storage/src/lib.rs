//! # geostore Storage
//!
//! Segmented memory for geostore.
//!
//! This crate provides the lowest-level storage abstraction for geostore.
//! A [`Memory`] hands out fixed-size, lazily allocated [`Segment`]s that are
//! **opaque byte regions** - the memory does not interpret the data it stores.
//!
//! ## Design Principles
//!
//! - A memory is a table of segments, all of the same size
//! - `segment(i)` always returns the same segment object for the same index
//! - No knowledge of codecs, lists or maps
//! - Must be `Send + Sync`: segment-table growth is synchronised
//!
//! ## Available Backends
//!
//! - [`Memory::on_heap`] - zeroed heap buffers
//! - [`Memory::off_heap`] - anonymous memory maps outside the allocator
//! - [`Memory::mapped_file`] - one growing memory-mapped file
//! - [`Memory::mapped_directory`] - one memory-mapped file per segment
//!
//! ## Example
//!
//! ```rust
//! use geostore_storage::Memory;
//!
//! let memory = Memory::on_heap(1024).unwrap();
//! let segment = memory.segment(0).unwrap();
//! segment.write(|bytes| bytes[..5].copy_from_slice(b"hello")).unwrap();
//! let data = segment.read(|bytes| bytes[..5].to_vec()).unwrap();
//! assert_eq!(&data, b"hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod directory;
mod error;
mod file;
mod heap;
mod memory;
mod segment;

pub use directory::MappedDirectoryMemory;
pub use error::{StorageError, StorageResult};
pub use file::MappedFileMemory;
pub use heap::{HeapMemory, OffHeapMemory};
pub use memory::{Memory, MemoryKind, DEFAULT_MAPPED_SEGMENT_SIZE, DEFAULT_SEGMENT_SIZE};
pub use segment::Segment;
