//! Fixed-size numeric codecs.
//!
//! All numbers are big-endian.

use crate::data_type::{window, window_mut, DataType};
use crate::error::{CodecError, CodecResult};
use bytes::{Buf, BufMut};

macro_rules! numeric_data_type {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $size:expr, $get:ident, $put:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl DataType for $name {
            type Value = $ty;

            fn size(&self, _value: &$ty) -> usize {
                $size
            }

            fn size_at(&self, _buf: &[u8], _position: usize) -> CodecResult<usize> {
                Ok($size)
            }

            fn fixed_size(&self) -> Option<usize> {
                Some($size)
            }

            fn write(&self, buf: &mut [u8], position: usize, value: &$ty) -> CodecResult<()> {
                window_mut(buf, position, $size)?.$put(*value);
                Ok(())
            }

            fn read(&self, buf: &[u8], position: usize) -> CodecResult<$ty> {
                Ok(window(buf, position, $size)?.$get())
            }
        }
    };
}

numeric_data_type!(
    /// Codec for `i8`.
    ByteDataType, i8, 1, get_i8, put_i8
);
numeric_data_type!(
    /// Codec for `i16`.
    ShortDataType, i16, 2, get_i16, put_i16
);
numeric_data_type!(
    /// Codec for `i32`.
    IntegerDataType, i32, 4, get_i32, put_i32
);
numeric_data_type!(
    /// Codec for `i64`. Used for keys and offsets throughout geostore.
    LongDataType, i64, 8, get_i64, put_i64
);
numeric_data_type!(
    /// Codec for `f32`.
    FloatDataType, f32, 4, get_f32, put_f32
);
numeric_data_type!(
    /// Codec for `f64`.
    DoubleDataType, f64, 8, get_f64, put_f64
);

/// Codec for an `i64` stored in its lowest `width` bytes (1 to 8).
///
/// Values are sign-extended on read; values outside the range of `width`
/// bytes are rejected on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmallLongDataType {
    width: usize,
}

impl SmallLongDataType {
    /// Creates a codec for `width`-byte integers.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidWidth`] unless `1 <= width <= 8`.
    pub fn new(width: usize) -> CodecResult<Self> {
        if !(1..=8).contains(&width) {
            return Err(CodecError::InvalidWidth { width });
        }
        Ok(Self { width })
    }

    /// Returns the configured width in bytes.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    fn fits(&self, value: i64) -> bool {
        let shift = 64 - 8 * self.width as u32;
        (value << shift) >> shift == value
    }
}

impl DataType for SmallLongDataType {
    type Value = i64;

    fn size(&self, _value: &i64) -> usize {
        self.width
    }

    fn size_at(&self, _buf: &[u8], _position: usize) -> CodecResult<usize> {
        Ok(self.width)
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(self.width)
    }

    fn write(&self, buf: &mut [u8], position: usize, value: &i64) -> CodecResult<()> {
        if !self.fits(*value) {
            return Err(CodecError::OutOfRange {
                value: *value,
                width: self.width,
            });
        }
        window_mut(buf, position, self.width)?.put_int(*value, self.width);
        Ok(())
    }

    fn read(&self, buf: &[u8], position: usize) -> CodecResult<i64> {
        Ok(window(buf, position, self.width)?.get_int(self.width))
    }
}

/// Codec for an `i32` stored in its lowest `width` bytes (1 to 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmallIntegerDataType {
    inner: SmallLongDataType,
}

impl SmallIntegerDataType {
    /// Creates a codec for `width`-byte integers.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidWidth`] unless `1 <= width <= 4`.
    pub fn new(width: usize) -> CodecResult<Self> {
        if !(1..=4).contains(&width) {
            return Err(CodecError::InvalidWidth { width });
        }
        Ok(Self {
            inner: SmallLongDataType::new(width)?,
        })
    }
}

impl DataType for SmallIntegerDataType {
    type Value = i32;

    fn size(&self, _value: &i32) -> usize {
        self.inner.width
    }

    fn size_at(&self, _buf: &[u8], _position: usize) -> CodecResult<usize> {
        Ok(self.inner.width)
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(self.inner.width)
    }

    fn write(&self, buf: &mut [u8], position: usize, value: &i32) -> CodecResult<()> {
        self.inner.write(buf, position, &i64::from(*value))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn read(&self, buf: &[u8], position: usize) -> CodecResult<i32> {
        // sign-extended from at most 4 bytes, always in i32 range
        self.inner.read(buf, position).map(|v| v as i32)
    }
}
