//! Batched ingestion into a shared map and reference resolution.

use crate::config::DEFAULT_BATCH_SIZE;
use crate::error::CoreResult;
use crate::map::DataMap;
use crate::stats::ImportStats;
use parking_lot::Mutex;
use tracing::{trace, warn};

/// Buffers entries and writes them to a shared map in batches.
///
/// Each producer thread owns a writer; the map behind the mutex is locked
/// once per batch instead of once per entry. Call [`BatchWriter::finish`] to
/// flush the remainder and observe errors. A writer dropped with buffered
/// entries flushes them on a best-effort basis and logs any failure.
///
/// # Example
///
/// ```
/// use geostore_codec::LongDataType;
/// use geostore_core::{BatchWriter, DataList, DataMap, DenseDataMap, ImportStats};
/// use geostore_storage::Memory;
/// use parking_lot::Mutex;
///
/// let list = DataList::fixed(Memory::on_heap(1024)?, LongDataType)?;
/// let map = Mutex::new(DenseDataMap::new(list)?);
/// let stats = ImportStats::new();
///
/// let mut writer = BatchWriter::new(&map, &stats);
/// writer.add(7, 70)?;
/// writer.finish()?;
///
/// assert_eq!(map.lock().get(7)?, Some(70));
/// # Ok::<(), geostore_core::CoreError>(())
/// ```
pub struct BatchWriter<'a, V, M: DataMap<V>> {
    map: &'a Mutex<M>,
    stats: &'a ImportStats,
    buffer: Vec<(i64, V)>,
    batch_size: usize,
}

impl<'a, V, M: DataMap<V>> BatchWriter<'a, V, M> {
    /// Creates a writer flushing every [`DEFAULT_BATCH_SIZE`] entries.
    pub fn new(map: &'a Mutex<M>, stats: &'a ImportStats) -> Self {
        Self::with_batch_size(map, stats, DEFAULT_BATCH_SIZE)
    }

    /// Creates a writer flushing every `batch_size` entries (at least one).
    pub fn with_batch_size(map: &'a Mutex<M>, stats: &'a ImportStats, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            map,
            stats,
            buffer: Vec::with_capacity(batch_size),
            batch_size,
        }
    }

    /// Returns the number of buffered entries.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Buffers an entry, flushing when the batch is full.
    ///
    /// # Errors
    ///
    /// Returns the error of the flush, if one happened and failed.
    pub fn add(&mut self, key: i64, value: V) -> CoreResult<()> {
        self.buffer.push((key, value));
        if self.buffer.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Writes the buffered entries to the map.
    ///
    /// The buffer is emptied even if the map rejects an entry.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by the map.
    pub fn flush(&mut self) -> CoreResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let entries = self.buffer.len() as u64;
        let result = self.map.lock().put_all(&self.buffer);
        self.buffer.clear();
        match result {
            Ok(()) => {
                self.stats.record_batch(entries);
                trace!(entries, "flushed batch");
                Ok(())
            }
            Err(e) => {
                self.stats.record_error();
                Err(e)
            }
        }
    }

    /// Flushes the remaining entries and consumes the writer.
    ///
    /// # Errors
    ///
    /// Returns the error of the final flush.
    pub fn finish(mut self) -> CoreResult<()> {
        self.flush()
    }
}

impl<V, M: DataMap<V>> Drop for BatchWriter<'_, V, M> {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let pending = self.buffer.len();
        if let Err(e) = self.flush() {
            warn!(pending, error = %e, "failed to flush batch writer on drop");
        }
    }
}

/// Writes every entry into `map` through a [`BatchWriter`] and returns the
/// number of entries.
///
/// # Errors
///
/// Returns the first flush error; entries of earlier batches stay written.
pub fn import_entries<V, M, I>(
    map: &Mutex<M>,
    entries: I,
    batch_size: usize,
    stats: &ImportStats,
) -> CoreResult<u64>
where
    M: DataMap<V>,
    I: IntoIterator<Item = (i64, V)>,
{
    let mut writer = BatchWriter::with_batch_size(map, stats, batch_size);
    let mut count = 0;
    for (key, value) in entries {
        writer.add(key, value)?;
        count += 1;
    }
    writer.finish()?;
    Ok(count)
}

/// Resolves a list of references (for example the node ids of a way) to
/// their values, in order.
///
/// Returns `None` if any reference is missing from the map, since a partial
/// geometry is not usable.
///
/// # Errors
///
/// Returns a storage or codec error from the lookups.
pub fn resolve_references<V, M>(
    map: &M,
    references: &[i64],
    stats: &ImportStats,
) -> CoreResult<Option<Vec<V>>>
where
    M: DataMap<V> + ?Sized,
{
    let values = map.get_all(references)?;
    let missing = values.iter().filter(|v| v.is_none()).count() as u64;
    stats.record_references(values.len() as u64 - missing, missing);
    if missing > 0 {
        return Ok(None);
    }
    Ok(values.into_iter().collect())
}
