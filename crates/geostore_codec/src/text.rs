//! Variable-size string and byte codecs.

use crate::data_type::{read_header, window, window_mut, write_header, DataType, LENGTH_HEADER_SIZE};
use crate::error::{CodecError, CodecResult};

/// Codec for UTF-8 strings: a length header followed by the raw bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringDataType;

impl DataType for StringDataType {
    type Value = String;

    fn size(&self, value: &String) -> usize {
        LENGTH_HEADER_SIZE + value.len()
    }

    fn size_at(&self, buf: &[u8], position: usize) -> CodecResult<usize> {
        read_header(buf, position)
    }

    fn write(&self, buf: &mut [u8], position: usize, value: &String) -> CodecResult<()> {
        BytesDataType.write_slice(buf, position, value.as_bytes())
    }

    fn read(&self, buf: &[u8], position: usize) -> CodecResult<String> {
        let bytes = BytesDataType.read(buf, position)?;
        String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
    }
}

/// Codec for opaque byte strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BytesDataType;

impl BytesDataType {
    fn write_slice(&self, buf: &mut [u8], position: usize, bytes: &[u8]) -> CodecResult<()> {
        let size = LENGTH_HEADER_SIZE + bytes.len();
        write_header(buf, position, size)?;
        window_mut(buf, position + LENGTH_HEADER_SIZE, bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }
}

impl DataType for BytesDataType {
    type Value = Vec<u8>;

    fn size(&self, value: &Vec<u8>) -> usize {
        LENGTH_HEADER_SIZE + value.len()
    }

    fn size_at(&self, buf: &[u8], position: usize) -> CodecResult<usize> {
        read_header(buf, position)
    }

    fn write(&self, buf: &mut [u8], position: usize, value: &Vec<u8>) -> CodecResult<()> {
        self.write_slice(buf, position, value)
    }

    fn read(&self, buf: &[u8], position: usize) -> CodecResult<Vec<u8>> {
        let size = read_header(buf, position)?;
        let payload = window(buf, position + LENGTH_HEADER_SIZE, size - LENGTH_HEADER_SIZE)?;
        Ok(payload.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_layout() {
        let mut buf = vec![0u8; 16];
        let value = "héllo".to_string();
        StringDataType.write(&mut buf, 2, &value).unwrap();

        assert_eq!(StringDataType.size(&value), 4 + 6);
        assert_eq!(&buf[2..6], &10u32.to_be_bytes());
        assert_eq!(StringDataType.size_at(&buf, 2).unwrap(), 10);
        assert_eq!(StringDataType.read(&buf, 2).unwrap(), value);
    }

    #[test]
    fn empty_string_is_header_only() {
        let mut buf = vec![0u8; 4];
        StringDataType.write(&mut buf, 0, &String::new()).unwrap();
        assert_eq!(StringDataType.read(&buf, 0).unwrap(), "");
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut buf = vec![0u8; 8];
        BytesDataType.write(&mut buf, 0, &vec![0xff, 0xfe]).unwrap();
        assert_eq!(StringDataType.read(&buf, 0), Err(CodecError::InvalidUtf8));
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let mut buf = vec![0u8; 12];
        BytesDataType.write(&mut buf, 0, &vec![1; 8]).unwrap();
        assert!(BytesDataType.read(&buf[..10], 0).is_err());
    }

    #[test]
    fn value_past_buffer_end_is_rejected() {
        let mut buf = vec![0u8; 6];
        assert!(BytesDataType.write(&mut buf, 0, &vec![1, 2, 3]).is_err());
    }

    proptest::proptest! {
        #[test]
        fn any_string_round_trips(value in ".*") {
            let mut buf = vec![0u8; StringDataType.size(&value)];
            StringDataType.write(&mut buf, 0, &value).unwrap();
            proptest::prop_assert_eq!(StringDataType.read(&buf, 0).unwrap(), value);
        }
    }
}
