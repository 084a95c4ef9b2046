//! Composite codecs: lists, maps and pairs.

use crate::data_type::{read_header, write_header, DataType, LENGTH_HEADER_SIZE};
use crate::error::{CodecError, CodecResult};
use crate::geo::CoordinateDataType;
use crate::numeric::LongDataType;
use std::collections::BTreeMap;

/// Codec for a list of values: a length header followed by the encoded
/// elements, back to back.
///
/// Elements are decoded until the total size recorded in the header is
/// consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListDataType<D> {
    element: D,
}

/// Codec for the node references of a way or the members of a relation.
pub type LongListDataType = ListDataType<LongDataType>;

/// Codec for a line string or ring.
pub type CoordinateArrayDataType = ListDataType<CoordinateDataType>;

impl<D: DataType> ListDataType<D> {
    /// Creates a list codec over `element`.
    #[must_use]
    pub const fn new(element: D) -> Self {
        Self { element }
    }
}

impl<D: DataType> DataType for ListDataType<D> {
    type Value = Vec<D::Value>;

    fn size(&self, value: &Self::Value) -> usize {
        LENGTH_HEADER_SIZE + value.iter().map(|v| self.element.size(v)).sum::<usize>()
    }

    fn size_at(&self, buf: &[u8], position: usize) -> CodecResult<usize> {
        read_header(buf, position)
    }

    fn write(&self, buf: &mut [u8], position: usize, value: &Self::Value) -> CodecResult<()> {
        write_header(buf, position, self.size(value))?;
        let mut cursor = position + LENGTH_HEADER_SIZE;
        for element in value {
            self.element.write(buf, cursor, element)?;
            cursor += self.element.size(element);
        }
        Ok(())
    }

    fn read(&self, buf: &[u8], position: usize) -> CodecResult<Self::Value> {
        let size = read_header(buf, position)?;
        let end = position + size;
        let mut cursor = position + LENGTH_HEADER_SIZE;
        let mut values = match self.element.fixed_size() {
            Some(n) if n > 0 => Vec::with_capacity((size - LENGTH_HEADER_SIZE) / n),
            _ => Vec::new(),
        };
        while cursor < end {
            let element_size = self.element.size_at(buf, cursor)?;
            if element_size == 0 || cursor + element_size > end {
                return Err(invalid_length(size, position));
            }
            values.push(self.element.read(buf, cursor)?);
            cursor += element_size;
        }
        Ok(values)
    }
}

/// Codec for an ordered map: a length header followed by alternating
/// encoded keys and values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapDataType<K, V> {
    key: K,
    value: V,
}

impl<K: DataType, V: DataType> MapDataType<K, V> {
    /// Creates a map codec.
    #[must_use]
    pub const fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

impl<K, V> DataType for MapDataType<K, V>
where
    K: DataType,
    K::Value: Ord,
    V: DataType,
{
    type Value = BTreeMap<K::Value, V::Value>;

    fn size(&self, value: &Self::Value) -> usize {
        LENGTH_HEADER_SIZE
            + value
                .iter()
                .map(|(k, v)| self.key.size(k) + self.value.size(v))
                .sum::<usize>()
    }

    fn size_at(&self, buf: &[u8], position: usize) -> CodecResult<usize> {
        read_header(buf, position)
    }

    fn write(&self, buf: &mut [u8], position: usize, value: &Self::Value) -> CodecResult<()> {
        write_header(buf, position, self.size(value))?;
        let mut cursor = position + LENGTH_HEADER_SIZE;
        for (k, v) in value {
            self.key.write(buf, cursor, k)?;
            cursor += self.key.size(k);
            self.value.write(buf, cursor, v)?;
            cursor += self.value.size(v);
        }
        Ok(())
    }

    fn read(&self, buf: &[u8], position: usize) -> CodecResult<Self::Value> {
        let size = read_header(buf, position)?;
        let end = position + size;
        let mut cursor = position + LENGTH_HEADER_SIZE;
        let mut map = BTreeMap::new();
        while cursor < end {
            let key_size = self.key.size_at(buf, cursor)?;
            if key_size == 0 || cursor + key_size > end {
                return Err(invalid_length(size, position));
            }
            let key = self.key.read(buf, cursor)?;
            cursor += key_size;

            let value_size = self.value.size_at(buf, cursor)?;
            if cursor + value_size > end {
                return Err(invalid_length(size, position));
            }
            let value = self.value.read(buf, cursor)?;
            cursor += value_size;
            map.insert(key, value);
        }
        Ok(map)
    }
}

/// Codec for a pair of values, encoded one after the other.
///
/// The pair is fixed-size when both halves are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairDataType<A, B> {
    left: A,
    right: B,
}

impl<A: DataType, B: DataType> PairDataType<A, B> {
    /// Creates a pair codec.
    #[must_use]
    pub const fn new(left: A, right: B) -> Self {
        Self { left, right }
    }
}

impl<A: DataType, B: DataType> DataType for PairDataType<A, B> {
    type Value = (A::Value, B::Value);

    fn size(&self, value: &Self::Value) -> usize {
        self.left.size(&value.0) + self.right.size(&value.1)
    }

    fn size_at(&self, buf: &[u8], position: usize) -> CodecResult<usize> {
        let left = self.left.size_at(buf, position)?;
        Ok(left + self.right.size_at(buf, position + left)?)
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(self.left.fixed_size()? + self.right.fixed_size()?)
    }

    fn write(&self, buf: &mut [u8], position: usize, value: &Self::Value) -> CodecResult<()> {
        self.left.write(buf, position, &value.0)?;
        self.right
            .write(buf, position + self.left.size(&value.0), &value.1)
    }

    fn read(&self, buf: &[u8], position: usize) -> CodecResult<Self::Value> {
        let left_size = self.left.size_at(buf, position)?;
        let left = self.left.read(buf, position)?;
        let right = self.right.read(buf, position + left_size)?;
        Ok((left, right))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn invalid_length(size: usize, position: usize) -> CodecError {
    // `size` came from a u32 header
    CodecError::InvalidLength {
        length: size as u32,
        position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::numeric::IntegerDataType;
    use crate::text::StringDataType;

    #[test]
    fn long_list_layout() {
        let data_type = LongListDataType::default();
        let value = vec![1i64, -2, 3];
        let mut buf = vec![0u8; data_type.size(&value)];
        data_type.write(&mut buf, 0, &value).unwrap();

        assert_eq!(buf.len(), 4 + 24);
        assert_eq!(&buf[0..4], &28u32.to_be_bytes());
        assert_eq!(data_type.read(&buf, 0).unwrap(), value);
    }

    #[test]
    fn empty_list_is_header_only() {
        let data_type = LongListDataType::default();
        let mut buf = vec![0u8; 4];
        data_type.write(&mut buf, 0, &Vec::new()).unwrap();
        assert_eq!(data_type.size_at(&buf, 0).unwrap(), 4);
        assert!(data_type.read(&buf, 0).unwrap().is_empty());
    }

    #[test]
    fn coordinate_array_round_trip() {
        let data_type = CoordinateArrayDataType::default();
        let ring = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 0.0),
        ];
        let mut buf = vec![0u8; 8 + data_type.size(&ring)];
        data_type.write(&mut buf, 8, &ring).unwrap();
        assert_eq!(data_type.read(&buf, 8).unwrap(), ring);
    }

    #[test]
    fn list_of_strings() {
        let data_type = ListDataType::new(StringDataType);
        let value = vec!["highway".to_string(), String::new(), "primary".to_string()];
        let mut buf = vec![0u8; data_type.size(&value)];
        data_type.write(&mut buf, 0, &value).unwrap();
        assert_eq!(data_type.read(&buf, 0).unwrap(), value);
    }

    #[test]
    fn misaligned_list_header_is_rejected() {
        let data_type = LongListDataType::default();
        let mut buf = vec![0u8; 16];
        buf[0..4].copy_from_slice(&10u32.to_be_bytes());
        assert!(matches!(
            data_type.read(&buf, 0),
            Err(CodecError::InvalidLength { length: 10, .. })
        ));
    }

    #[test]
    fn tag_map_round_trip() {
        let data_type = MapDataType::new(StringDataType, StringDataType);
        let mut tags = BTreeMap::new();
        tags.insert("name".to_string(), "Main Street".to_string());
        tags.insert("highway".to_string(), "residential".to_string());

        let mut buf = vec![0u8; data_type.size(&tags)];
        data_type.write(&mut buf, 0, &tags).unwrap();
        assert_eq!(data_type.size_at(&buf, 0).unwrap(), buf.len());
        assert_eq!(data_type.read(&buf, 0).unwrap(), tags);
    }

    #[test]
    fn pair_sizes() {
        let fixed = PairDataType::new(LongDataType, IntegerDataType);
        assert_eq!(fixed.fixed_size(), Some(12));

        let variable = PairDataType::new(LongDataType, StringDataType);
        assert_eq!(variable.fixed_size(), None);

        let value = (42i64, "relation".to_string());
        let mut buf = vec![0u8; variable.size(&value)];
        variable.write(&mut buf, 0, &value).unwrap();
        assert_eq!(variable.size_at(&buf, 0).unwrap(), 8 + 4 + 8);
        assert_eq!(variable.read(&buf, 0).unwrap(), value);
    }

    proptest::proptest! {
        #[test]
        fn any_long_list_round_trips(value in proptest::collection::vec(proptest::num::i64::ANY, 0..64)) {
            let data_type = LongListDataType::default();
            let mut buf = vec![0u8; data_type.size(&value)];
            data_type.write(&mut buf, 0, &value).unwrap();
            proptest::prop_assert_eq!(data_type.read(&buf, 0).unwrap(), value);
        }
    }
}
