//! Import statistics.
//!
//! Counters are passed by reference into the import routines rather than
//! kept in globals, so concurrent imports each get their own numbers.
//!
//! # Usage
//!
//! ```
//! use geostore_core::ImportStats;
//!
//! let stats = ImportStats::new();
//! // ... pass &stats to import_entries / resolve_references ...
//! let snapshot = stats.snapshot();
//! assert_eq!(snapshot.entries_written, 0);
//! ```

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one import run.
///
/// All counters are atomic and can be read while writers are flushing.
#[derive(Debug, Default)]
pub struct ImportStats {
    /// Entries handed to a map through a batch flush.
    entries_written: AtomicU64,
    /// Batches flushed.
    batches_flushed: AtomicU64,
    /// References resolved to a value.
    references_resolved: AtomicU64,
    /// References with no value in the cache.
    references_missing: AtomicU64,
    /// Failed flushes or lookups.
    errors: AtomicU64,
}

impl ImportStats {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_batch(&self, entries: u64) {
        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
        self.entries_written.fetch_add(entries, Ordering::Relaxed);
    }

    pub(crate) fn record_references(&self, resolved: u64, missing: u64) {
        self.references_resolved
            .fetch_add(resolved, Ordering::Relaxed);
        self.references_missing.fetch_add(missing, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of entries written.
    pub fn entries_written(&self) -> u64 {
        self.entries_written.load(Ordering::Relaxed)
    }

    /// Returns the number of batches flushed.
    pub fn batches_flushed(&self) -> u64 {
        self.batches_flushed.load(Ordering::Relaxed)
    }

    /// Returns the number of references resolved.
    pub fn references_resolved(&self) -> u64 {
        self.references_resolved.load(Ordering::Relaxed)
    }

    /// Returns the number of references that had no value.
    pub fn references_missing(&self) -> u64 {
        self.references_missing.load(Ordering::Relaxed)
    }

    /// Returns the number of errors.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> ImportSnapshot {
        ImportSnapshot {
            entries_written: self.entries_written(),
            batches_flushed: self.batches_flushed(),
            references_resolved: self.references_resolved(),
            references_missing: self.references_missing(),
            errors: self.errors(),
        }
    }
}

/// A point-in-time copy of [`ImportStats`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportSnapshot {
    /// Entries written.
    pub entries_written: u64,
    /// Batches flushed.
    pub batches_flushed: u64,
    /// References resolved.
    pub references_resolved: u64,
    /// References missing.
    pub references_missing: u64,
    /// Errors.
    pub errors: u64,
}
