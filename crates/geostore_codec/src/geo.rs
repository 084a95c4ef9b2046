//! Coordinate codecs.

use crate::data_type::{window, window_mut, DataType};
use crate::error::CodecResult;
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

/// Fixed-point scale used by [`LonLatDataType`] (7 decimal places).
pub const LON_LAT_SCALE: f64 = 1e7;

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl Coordinate {
    /// Creates a coordinate from longitude and latitude.
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Lossless codec for [`Coordinate`]: two big-endian `f64`, longitude first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinateDataType;

impl CoordinateDataType {
    const SIZE: usize = 16;
}

impl DataType for CoordinateDataType {
    type Value = Coordinate;

    fn size(&self, _value: &Coordinate) -> usize {
        Self::SIZE
    }

    fn size_at(&self, _buf: &[u8], _position: usize) -> CodecResult<usize> {
        Ok(Self::SIZE)
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(Self::SIZE)
    }

    fn write(&self, buf: &mut [u8], position: usize, value: &Coordinate) -> CodecResult<()> {
        let mut out = window_mut(buf, position, Self::SIZE)?;
        out.put_f64(value.lon);
        out.put_f64(value.lat);
        Ok(())
    }

    fn read(&self, buf: &[u8], position: usize) -> CodecResult<Coordinate> {
        let mut input = window(buf, position, Self::SIZE)?;
        let lon = input.get_f64();
        let lat = input.get_f64();
        Ok(Coordinate { lon, lat })
    }
}

/// Compact codec for [`Coordinate`]: two big-endian `i32` holding degrees
/// scaled by [`LON_LAT_SCALE`].
///
/// Precision is 1e-7 degrees (about a centimetre), which is the precision
/// of OSM node coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LonLatDataType;

impl LonLatDataType {
    const SIZE: usize = 8;

    #[allow(clippy::cast_possible_truncation)]
    fn encode(degrees: f64) -> i32 {
        (degrees * LON_LAT_SCALE).round() as i32
    }

    fn decode(fixed: i32) -> f64 {
        f64::from(fixed) / LON_LAT_SCALE
    }
}

impl DataType for LonLatDataType {
    type Value = Coordinate;

    fn size(&self, _value: &Coordinate) -> usize {
        Self::SIZE
    }

    fn size_at(&self, _buf: &[u8], _position: usize) -> CodecResult<usize> {
        Ok(Self::SIZE)
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(Self::SIZE)
    }

    fn write(&self, buf: &mut [u8], position: usize, value: &Coordinate) -> CodecResult<()> {
        let mut out = window_mut(buf, position, Self::SIZE)?;
        out.put_i32(Self::encode(value.lon));
        out.put_i32(Self::encode(value.lat));
        Ok(())
    }

    fn read(&self, buf: &[u8], position: usize) -> CodecResult<Coordinate> {
        let mut input = window(buf, position, Self::SIZE)?;
        let lon = Self::decode(input.get_i32());
        let lat = Self::decode(input.get_i32());
        Ok(Coordinate { lon, lat })
    }
}
