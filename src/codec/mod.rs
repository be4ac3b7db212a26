//! Binary codec for the VeriBlock wire format
//!
//! This module provides:
//! - Bounds-checked read/write streams
//! - Length-prefixed and trimmed-integer field helpers
//! - `Encode`/`Decode` traits implemented by every wire entity

pub mod error;
pub mod stream;
pub mod varlen;

pub use error::CodecError;
pub use stream::{ByteSink, ReadStream, SizeCounter, WriteStream};
pub use varlen::{
    read_array_of, read_network_byte, read_single_byte_len_value, read_single_i32_be_value,
    read_single_i64_be_value, read_var_len_value, trimmed_bytes, write_single_be_value,
    write_single_byte_len_value, write_single_fixed_be_value, write_var_len_value,
};

/// Types with a canonical wire encoding
pub trait Encode {
    /// Write the wire form into `out`
    fn encode<S: ByteSink>(&self, out: &mut S) -> Result<(), CodecError>;

    /// Exact size of the wire form
    fn encoded_len(&self) -> Result<usize, CodecError> {
        let mut counter = SizeCounter::new();
        self.encode(&mut counter)?;
        Ok(counter.len())
    }

    /// Serialize into a stream sized exactly for this value
    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = WriteStream::with_capacity(self.encoded_len()?);
        self.encode(&mut out)?;
        Ok(out.into_inner())
    }

    fn to_hex(&self) -> Result<String, CodecError> {
        Ok(hex::encode_upper(self.to_bytes()?))
    }
}

/// Types that can be read from the wire format
pub trait Decode: Sized {
    /// Read one value, advancing the stream past it
    fn decode(stream: &mut ReadStream<'_>) -> Result<Self, CodecError>;

    /// Decode a buffer holding exactly one value
    fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        read_nested(data, Self::decode)
    }

    fn from_hex(hex_str: &str) -> Result<Self, CodecError> {
        Self::from_bytes(&hex::decode(hex_str.trim())?)
    }
}

/// Run `read` over a whole sub-buffer, rejecting anything it leaves unread
pub fn read_nested<'a, T, F>(data: &'a [u8], read: F) -> Result<T, CodecError>
where
    F: FnOnce(&mut ReadStream<'a>) -> Result<T, CodecError>,
{
    let mut stream = ReadStream::new(data);
    let value = read(&mut stream)?;
    if stream.remaining() > 0 {
        return Err(CodecError::TrailingBytes(stream.remaining()));
    }
    Ok(value)
}
