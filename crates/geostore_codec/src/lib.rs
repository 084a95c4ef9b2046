//! # geostore codec
//!
//! Positional binary codecs for the values stored in geostore lists and maps.
//!
//! Every codec implements [`DataType`], which measures, writes and reads a
//! value at an arbitrary position of a byte slice. Codecs come in two
//! flavours:
//!
//! - **fixed-size**: numbers, coordinates and pairs of fixed-size codecs.
//!   [`DataType::fixed_size`] returns the width.
//! - **variable-size**: strings, byte strings, lists and maps. The encoding
//!   starts with a 4-byte big-endian header holding the total size of the
//!   value, header included.
//!
//! All numbers are big-endian.
//!
//! ## Usage
//!
//! ```
//! use geostore_codec::{DataType, LongListDataType};
//!
//! let data_type = LongListDataType::default();
//! let refs = vec![10i64, 11, 12];
//!
//! let mut buf = vec![0u8; data_type.size(&refs)];
//! data_type.write(&mut buf, 0, &refs).unwrap();
//! assert_eq!(data_type.read(&buf, 0).unwrap(), refs);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod data_type;
mod error;
mod geo;
mod list;
mod numeric;
mod text;

pub use data_type::{DataType, LENGTH_HEADER_SIZE};
pub use error::{CodecError, CodecResult};
pub use geo::{Coordinate, CoordinateDataType, LonLatDataType, LON_LAT_SCALE};
pub use list::{
    CoordinateArrayDataType, ListDataType, LongListDataType, MapDataType, PairDataType,
};
pub use numeric::{
    ByteDataType, DoubleDataType, FloatDataType, IntegerDataType, LongDataType, ShortDataType,
    SmallIntegerDataType, SmallLongDataType,
};
pub use text::{BytesDataType, StringDataType};
