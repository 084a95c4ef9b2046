//! # geostore testkit
//!
//! Test utilities for geostore.
//!
//! This crate provides:
//! - Fixtures opening lists, maps and memories over every backend
//! - Property-based test generators using proptest
//! - Stress runs for concurrent batch writers and readers
//! - Cross-crate integration tests (under `tests/`)
//!
//! ## Usage
//!
//! ```
//! use geostore_codec::LongDataType;
//! use geostore_core::DataMap;
//! use geostore_testkit::prelude::*;
//!
//! let fixture = TestMemory::new();
//! for kind in ALL_KINDS {
//!     let mut map = fixture.dense_map(kind, &format!("{kind:?}"), 1024, LongDataType);
//!     map.put(3, &30).unwrap();
//!     assert_eq!(map.get(3).unwrap(), Some(30));
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
