//! Bounds-checked byte streams
//!
//! - `ReadStream` walks a borrowed buffer and fails instead of reading past its end
//! - `WriteStream` fills a buffer whose capacity is fixed up front
//! - `SizeCounter` measures an encoding without allocating
//!
//! VeriBlock-native fields are big-endian, Bitcoin-derived ones little-endian,
//! so both orders are provided.

use super::error::CodecError;

// =============================================================================
// Reading
// =============================================================================

/// Sequential reader over an in-memory buffer
#[derive(Debug, Clone)]
pub struct ReadStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ReadStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Read the next `size` bytes and advance past them
    ///
    /// On failure `position` is the offset of the first missing byte, which
    /// is the end of the buffer.
    pub fn read(&mut self, size: usize) -> Result<&'a [u8], CodecError> {
        if !self.has_more(size) {
            return Err(CodecError::OutOfData {
                position: self.data.len(),
                requested: size,
                remaining: self.remaining(),
            });
        }

        let bytes = &self.data[self.pos..self.pos + size];
        self.pos += size;
        Ok(bytes)
    }

    /// Read exactly `N` bytes into an array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, CodecError> {
        Ok(i8::from_be_bytes(self.read_array()?))
    }

    pub fn read_i16_be(&mut self) -> Result<i16, CodecError> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u16_be(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32_be(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32_be(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i16_le(&mut self) -> Result<i16, CodecError> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16_le(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn has_more(&self, bytes: usize) -> bool {
        self.remaining() >= bytes
    }

    pub fn reset(&mut self) {
        self.pos = 0;
    }
}

// =============================================================================
// Writing
// =============================================================================

/// Destination for encoded bytes
pub trait ByteSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), CodecError>;

    fn write_u8(&mut self, value: u8) -> Result<(), CodecError> {
        self.write(&[value])
    }

    fn write_i8(&mut self, value: i8) -> Result<(), CodecError> {
        self.write(&value.to_be_bytes())
    }

    fn write_i16_be(&mut self, value: i16) -> Result<(), CodecError> {
        self.write(&value.to_be_bytes())
    }

    fn write_u16_be(&mut self, value: u16) -> Result<(), CodecError> {
        self.write(&value.to_be_bytes())
    }

    fn write_i32_be(&mut self, value: i32) -> Result<(), CodecError> {
        self.write(&value.to_be_bytes())
    }

    fn write_u32_be(&mut self, value: u32) -> Result<(), CodecError> {
        self.write(&value.to_be_bytes())
    }

    fn write_i16_le(&mut self, value: i16) -> Result<(), CodecError> {
        self.write(&value.to_le_bytes())
    }

    fn write_u16_le(&mut self, value: u16) -> Result<(), CodecError> {
        self.write(&value.to_le_bytes())
    }

    fn write_i32_le(&mut self, value: i32) -> Result<(), CodecError> {
        self.write(&value.to_le_bytes())
    }

    fn write_u32_le(&mut self, value: u32) -> Result<(), CodecError> {
        self.write(&value.to_le_bytes())
    }
}

/// Writer into a buffer of fixed capacity; never grows
#[derive(Debug, Clone)]
pub struct WriteStream {
    data: Vec<u8>,
    capacity: usize,
}

impl WriteStream {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn position(&self) -> usize {
        self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.data.len()
    }

    pub fn has_more(&self, bytes: usize) -> bool {
        self.remaining() >= bytes
    }

    /// Rewind to the start, discarding written bytes
    pub fn reset(&mut self) {
        self.data.clear();
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl ByteSink for WriteStream {
    fn write(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        if !self.has_more(bytes.len()) {
            return Err(CodecError::BufferOverflow {
                position: self.position(),
                requested: bytes.len(),
                remaining: self.remaining(),
            });
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }
}

/// Counts bytes instead of storing them, used to size a `WriteStream`
#[derive(Debug, Default, Clone, Copy)]
pub struct SizeCounter {
    len: usize,
}

impl SizeCounter {
    pub fn new() -> Self {
        Self { len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl ByteSink for SizeCounter {
    fn write(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        self.len += bytes.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_mixed_endianness() {
        let data = [0x00, 0x00, 0x13, 0x88, 0x88, 0x13, 0x00, 0x00, 0xFF, 0xFE];
        let mut stream = ReadStream::new(&data);

        assert_eq!(stream.read_i32_be().unwrap(), 5000);
        assert_eq!(stream.read_i32_le().unwrap(), 5000);
        assert_eq!(stream.read_i16_be().unwrap(), -2);
        assert!(!stream.has_more(1));
        assert_eq!(stream.position(), 10);

        stream.reset();
        assert_eq!(stream.read_u16_le().unwrap(), 0);
        assert_eq!(stream.remaining(), 8);
    }

    #[test]
    fn test_out_of_data_reports_first_missing_byte() {
        let data = [0x01, 0x02, 0x03];
        let mut stream = ReadStream::new(&data);
        stream.read_u8().unwrap();

        let err = stream.read_u32_be().unwrap_err();
        assert_eq!(
            err,
            CodecError::OutOfData {
                position: 3,
                requested: 4,
                remaining: 2
            }
        );
        // failed reads do not move the cursor
        assert_eq!(stream.position(), 1);
    }

    #[test]
    fn test_zero_length_read() {
        let mut stream = ReadStream::new(&[]);
        assert!(stream.read(0).unwrap().is_empty());
    }

    #[test]
    fn test_write_stream_is_fixed_capacity() {
        let mut out = WriteStream::with_capacity(6);
        out.write_i16_be(-2).unwrap();
        out.write_u32_le(1).unwrap();
        assert_eq!(out.as_slice(), &[0xFF, 0xFE, 0x01, 0x00, 0x00, 0x00]);

        let err = out.write_u8(0).unwrap_err();
        assert!(matches!(err, CodecError::BufferOverflow { position: 6, .. }));
    }

    #[test]
    fn test_size_counter() {
        let mut counter = SizeCounter::new();
        counter.write_i32_be(7).unwrap();
        counter.write(&[0u8; 12]).unwrap();
        assert_eq!(counter.len(), 16);
    }
}
