//! Append-only random-access lists over a segmented memory.

use crate::error::{CoreError, CoreResult};
use geostore_codec::{DataType, LongDataType};
use geostore_storage::Memory;
use tracing::debug;

/// How elements are placed in the memory.
#[derive(Debug)]
enum Layout {
    /// Element `i` lives at byte `i * element_size`.
    Fixed { element_size: usize, len: u64 },
    /// Elements are appended to a byte log; `offsets[i]` is the position of
    /// element `i`. Elements never straddle a segment boundary.
    Variable {
        offsets: Box<DataList<LongDataType>>,
        write_position: u64,
    },
}

/// An append-only sequence of values stored in a [`Memory`].
///
/// Fixed-size lists compute the position of an element from its index.
/// Variable-size lists append encoded values to a log and keep their
/// positions in a second, fixed-size list of `i64` offsets.
///
/// A list owns its memory: [`DataList::close`] and [`DataList::clean`]
/// forward to it.
///
/// # Example
///
/// ```
/// use geostore_codec::LongDataType;
/// use geostore_core::DataList;
/// use geostore_storage::Memory;
///
/// let mut list = DataList::fixed(Memory::on_heap(1024)?, LongDataType)?;
/// let index = list.add(&42)?;
/// assert_eq!(list.get(index)?, 42);
/// # Ok::<(), geostore_core::CoreError>(())
/// ```
#[derive(Debug)]
pub struct DataList<D: DataType> {
    memory: Memory,
    data_type: D,
    layout: Layout,
}

impl<D: DataType> DataList<D> {
    /// Creates an empty list of fixed-size elements.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidLayout`] if `data_type` is not fixed-size,
    /// its size is zero, or its size does not divide the segment size.
    pub fn fixed(memory: Memory, data_type: D) -> CoreResult<Self> {
        Self::with_len(memory, data_type, 0)
    }

    /// Restores a fixed-size list of `len` elements over memory that already
    /// holds them, typically a mapped file or directory reopened after a run.
    ///
    /// # Errors
    ///
    /// Same as [`DataList::fixed`].
    pub fn with_len(memory: Memory, data_type: D, len: u64) -> CoreResult<Self> {
        let segment_size = memory.segment_size();
        let element_size = data_type
            .fixed_size()
            .ok_or_else(|| CoreError::invalid_layout("data type is not fixed-size"))?;
        if element_size == 0 || element_size > segment_size || segment_size % element_size != 0 {
            return Err(CoreError::invalid_layout(format!(
                "element size {element_size} does not divide segment size {segment_size}"
            )));
        }
        Ok(Self {
            memory,
            data_type,
            layout: Layout::Fixed { element_size, len },
        })
    }

    /// Creates a list of variable-size elements.
    ///
    /// Values are appended to `memory`; `offsets` records where each one
    /// starts. If `offsets` is not empty the list resumes after its last
    /// element, which must be present in `memory`.
    ///
    /// # Errors
    ///
    /// Returns an error if the last element cannot be read back.
    pub fn variable(memory: Memory, offsets: DataList<LongDataType>, data_type: D) -> CoreResult<Self> {
        let write_position = match offsets.len().checked_sub(1) {
            Some(last) => {
                let position = offset_position(offsets.get(last)?)?;
                let (segment, offset) = locate(&memory, position)?;
                let size = memory
                    .segment(segment)?
                    .read(|buf| data_type.size_at(buf, offset))??;
                let end = position + size as u64;
                debug!(elements = last + 1, end, "resumed variable-size list");
                end
            }
            None => 0,
        };
        Ok(Self {
            memory,
            data_type,
            layout: Layout::Variable {
                offsets: Box::new(offsets),
                write_position,
            },
        })
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> u64 {
        match &self.layout {
            Layout::Fixed { len, .. } => *len,
            Layout::Variable { offsets, .. } => offsets.len(),
        }
    }

    /// Returns whether the list has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the codec of the elements.
    pub fn data_type(&self) -> &D {
        &self.data_type
    }

    /// Returns the memory holding the elements.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Returns the offset list of a variable-size list.
    pub fn offsets(&self) -> Option<&DataList<LongDataType>> {
        match &self.layout {
            Layout::Fixed { .. } => None,
            Layout::Variable { offsets, .. } => Some(offsets),
        }
    }

    /// Appends `value` and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ValueTooLarge`] if a variable-size value does not
    /// fit in a segment, or a storage or codec error.
    pub fn add(&mut self, value: &D::Value) -> CoreResult<u64> {
        match &mut self.layout {
            Layout::Fixed { element_size, len } => {
                let index = *len;
                let position = index * *element_size as u64;
                write_at(&self.memory, &self.data_type, position, value)?;
                *len += 1;
                Ok(index)
            }
            Layout::Variable {
                offsets,
                write_position,
            } => {
                let segment_size = self.memory.segment_size();
                let size = self.data_type.size(value);
                if size > segment_size {
                    return Err(CoreError::ValueTooLarge { size, segment_size });
                }
                let mut position = *write_position;
                let offset = (position % segment_size as u64) as usize;
                if offset + size > segment_size {
                    position += (segment_size - offset) as u64;
                }
                write_at(&self.memory, &self.data_type, position, value)?;
                let stored = i64::try_from(position)
                    .map_err(|_| CoreError::invalid_layout("log position exceeds i64"))?;
                let index = offsets.add(&stored)?;
                *write_position = position + size as u64;
                Ok(index)
            }
        }
    }

    /// Overwrites the element at `index` of a fixed-size list.
    ///
    /// Writing past the end extends the list to `index + 1`; skipped slots
    /// read back as the zero value of the codec.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Unsupported`] for variable-size lists.
    pub fn set(&mut self, index: u64, value: &D::Value) -> CoreResult<()> {
        match &mut self.layout {
            Layout::Fixed { element_size, len } => {
                let position = index
                    .checked_mul(*element_size as u64)
                    .ok_or(CoreError::IndexOutOfBounds { index, len: *len })?;
                write_at(&self.memory, &self.data_type, position, value)?;
                if index >= *len {
                    *len = index + 1;
                }
                Ok(())
            }
            Layout::Variable { .. } => Err(CoreError::unsupported("set", "variable-size DataList")),
        }
    }

    /// Drops every element from `len` on. Used to undo a partial write.
    ///
    /// # Errors
    ///
    /// Returns an error if the new end of a variable-size list cannot be read.
    pub(crate) fn truncate(&mut self, len: u64) -> CoreResult<()> {
        if len >= self.len() {
            return Ok(());
        }
        match &mut self.layout {
            Layout::Fixed { len: current, .. } => *current = len,
            Layout::Variable {
                offsets,
                write_position,
            } => {
                *write_position = offset_position(offsets.get(len)?)?;
                offsets.truncate(len)?;
            }
        }
        Ok(())
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexOutOfBounds`] if `index >= len()`.
    pub fn get(&self, index: u64) -> CoreResult<D::Value> {
        let len = self.len();
        if index >= len {
            return Err(CoreError::IndexOutOfBounds { index, len });
        }
        let position = match &self.layout {
            Layout::Fixed { element_size, .. } => index * *element_size as u64,
            Layout::Variable { offsets, .. } => offset_position(offsets.get(index)?)?,
        };
        self.at(position, |buf, offset| self.data_type.read(buf, offset))
    }

    /// Iterates over the elements in index order.
    pub fn iter(&self) -> impl Iterator<Item = CoreResult<D::Value>> + '_ {
        (0..self.len()).map(move |index| self.get(index))
    }

    /// Flushes mapped memory to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if a flush fails.
    pub fn flush(&self) -> CoreResult<()> {
        self.memory.flush()?;
        if let Layout::Variable { offsets, .. } = &self.layout {
            offsets.flush()?;
        }
        Ok(())
    }

    /// Closes the memory of the list (and of its offsets).
    ///
    /// # Errors
    ///
    /// Returns an error if flushing mapped memory fails.
    pub fn close(&self) -> CoreResult<()> {
        self.memory.close()?;
        if let Layout::Variable { offsets, .. } = &self.layout {
            offsets.close()?;
        }
        Ok(())
    }

    /// Closes the list and deletes anything it persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if a backing file or directory cannot be removed.
    pub fn clean(&self) -> CoreResult<()> {
        self.memory.clean()?;
        if let Layout::Variable { offsets, .. } = &self.layout {
            offsets.clean()?;
        }
        Ok(())
    }

    /// Runs `f` over the segment holding `position` with the offset inside it.
    fn at<R>(
        &self,
        position: u64,
        f: impl FnOnce(&[u8], usize) -> geostore_codec::CodecResult<R>,
    ) -> CoreResult<R> {
        let (segment, offset) = locate(&self.memory, position)?;
        Ok(self.memory.segment(segment)?.read(|buf| f(buf, offset))??)
    }
}

/// Splits a byte position into a segment index and an offset.
fn locate(memory: &Memory, position: u64) -> CoreResult<(u32, usize)> {
    let segment_size = memory.segment_size() as u64;
    let segment = u32::try_from(position / segment_size)
        .map_err(|_| CoreError::invalid_layout(format!("position {position} is not addressable")))?;
    Ok((segment, (position % segment_size) as usize))
}

fn write_at<D: DataType>(memory: &Memory, data_type: &D, position: u64, value: &D::Value) -> CoreResult<()> {
    let (segment, offset) = locate(memory, position)?;
    Ok(memory
        .segment(segment)?
        .write(|buf| data_type.write(buf, offset, value))??)
}

fn offset_position(stored: i64) -> CoreResult<u64> {
    u64::try_from(stored).map_err(|_| CoreError::invalid_layout(format!("negative offset {stored}")))
}
