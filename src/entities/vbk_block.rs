//! VeriBlock block header (64 bytes, big-endian)

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::constants::{
    PREVIOUS_BLOCK_LENGTH, PREVIOUS_KEYSTONE_LENGTH, VBK_HEADER_SIZE, VBK_MERKLE_ROOT_LENGTH,
};
use super::hash::{as_hex, VBlakeHash};
use crate::codec::{
    read_nested, read_single_byte_len_value, write_single_byte_len_value, ByteSink, CodecError,
    Decode, Encode, ReadStream, WriteStream,
};

/// Hash pointers are truncated fragments: 12 bytes for the previous block,
/// 9 for each keystone and 16 for the merkle root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VbkBlock {
    pub height: i32,
    pub version: i16,
    pub previous_block: VBlakeHash,
    pub previous_keystone: VBlakeHash,
    pub second_previous_keystone: VBlakeHash,
    #[serde(serialize_with = "as_hex")]
    pub merkle_root: [u8; VBK_MERKLE_ROOT_LENGTH],
    pub timestamp: i32,
    pub difficulty: i32,
    pub nonce: i32,
}

fn write_fragment<S: ByteSink>(out: &mut S, hash: &VBlakeHash, length: usize) -> Result<(), CodecError> {
    if hash.len() != length {
        return Err(CodecError::InvalidHashLength {
            expected: length,
            actual: hash.len(),
        });
    }
    out.write(hash.as_bytes())
}

impl VbkBlock {
    /// Read the raw 64-byte header
    pub fn extract(stream: &mut ReadStream<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            height: stream.read_i32_be()?,
            version: stream.read_i16_be()?,
            previous_block: VBlakeHash::extract(stream, PREVIOUS_BLOCK_LENGTH)?,
            previous_keystone: VBlakeHash::extract(stream, PREVIOUS_KEYSTONE_LENGTH)?,
            second_previous_keystone: VBlakeHash::extract(stream, PREVIOUS_KEYSTONE_LENGTH)?,
            merkle_root: stream.read_array()?,
            timestamp: stream.read_i32_be()?,
            difficulty: stream.read_i32_be()?,
            nonce: stream.read_i32_be()?,
        })
    }

    /// Read a header prefixed by its one-byte length (always 64)
    pub fn read(stream: &mut ReadStream<'_>) -> Result<Self, CodecError> {
        let bytes = read_single_byte_len_value(stream, VBK_HEADER_SIZE, VBK_HEADER_SIZE)?;
        read_nested(bytes, Self::extract)
    }

    pub fn from_raw(bytes: &[u8]) -> Result<Self, CodecError> {
        read_nested(bytes, Self::extract)
    }

    /// The raw 64-byte header
    pub fn raw(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = WriteStream::with_capacity(VBK_HEADER_SIZE);
        out.write_i32_be(self.height)?;
        out.write_i16_be(self.version)?;
        write_fragment(&mut out, &self.previous_block, PREVIOUS_BLOCK_LENGTH)?;
        write_fragment(&mut out, &self.previous_keystone, PREVIOUS_KEYSTONE_LENGTH)?;
        write_fragment(&mut out, &self.second_previous_keystone, PREVIOUS_KEYSTONE_LENGTH)?;
        out.write(&self.merkle_root)?;
        out.write_i32_be(self.timestamp)?;
        out.write_i32_be(self.difficulty)?;
        out.write_i32_be(self.nonce)?;
        Ok(out.into_inner())
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp as u32 as i64, 0)
    }
}

/// `[0x40][64 raw bytes]`
impl Encode for VbkBlock {
    fn encode<S: ByteSink>(&self, out: &mut S) -> Result<(), CodecError> {
        write_single_byte_len_value(out, &self.raw()?)
    }
}

impl Decode for VbkBlock {
    fn decode(stream: &mut ReadStream<'_>) -> Result<Self, CodecError> {
        Self::read(stream)
    }
}
