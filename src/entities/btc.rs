//! Bitcoin records embedded in VeriBlock transactions
//!
//! Header integers are little-endian and hashes stay in wire byte order;
//! only display forms are byte-reversed.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::constants::{BTC_HEADER_SIZE, HASH256_SIZE, MAX_LAYER_COUNT_MERKLE, MAX_MERKLE_BYTES, MAX_RAWTX_SIZE};
use super::hash::{as_hex, Sha256Hash};
use crate::codec::{
    read_nested, read_single_byte_len_value, read_single_i32_be_value, read_var_len_value,
    write_single_byte_len_value, write_single_fixed_be_value, write_var_len_value, ByteSink,
    CodecError, Decode, Encode, ReadStream, WriteStream,
};
use crate::crypto::{double_sha256, fold_merkle_path};

// =============================================================================
// Block header
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BtcBlock {
    pub version: i32,
    pub previous_block: Sha256Hash,
    pub merkle_root: Sha256Hash,
    pub timestamp: i32,
    pub bits: i32,
    pub nonce: i32,
}

impl BtcBlock {
    /// Read the raw 80-byte header
    pub fn extract(stream: &mut ReadStream<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            version: stream.read_i32_le()?,
            previous_block: Sha256Hash::extract(stream)?,
            merkle_root: Sha256Hash::extract(stream)?,
            timestamp: stream.read_i32_le()?,
            bits: stream.read_i32_le()?,
            nonce: stream.read_i32_le()?,
        })
    }

    /// Read a header prefixed by its one-byte length (always 80)
    pub fn read(stream: &mut ReadStream<'_>) -> Result<Self, CodecError> {
        let bytes = read_single_byte_len_value(stream, BTC_HEADER_SIZE, BTC_HEADER_SIZE)?;
        read_nested(bytes, Self::extract)
    }

    /// The raw 80-byte header
    pub fn raw(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = WriteStream::with_capacity(BTC_HEADER_SIZE);
        out.write_i32_le(self.version)?;
        out.write(self.previous_block.as_bytes())?;
        out.write(self.merkle_root.as_bytes())?;
        out.write_i32_le(self.timestamp)?;
        out.write_i32_le(self.bits)?;
        out.write_i32_le(self.nonce)?;
        Ok(out.into_inner())
    }

    pub fn from_raw(bytes: &[u8]) -> Result<Self, CodecError> {
        read_nested(bytes, Self::extract)
    }

    /// Double SHA-256 of the raw header, in wire order
    pub fn hash(&self) -> Result<Sha256Hash, CodecError> {
        Ok(Sha256Hash::new(double_sha256(&self.raw()?)))
    }

    /// Block time; the header stores it as an unsigned 32-bit value
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp as u32 as i64, 0)
    }
}

/// `[0x50][80 raw bytes]`
impl Encode for BtcBlock {
    fn encode<S: ByteSink>(&self, out: &mut S) -> Result<(), CodecError> {
        write_single_byte_len_value(out, &self.raw()?)
    }
}

impl Decode for BtcBlock {
    fn decode(stream: &mut ReadStream<'_>) -> Result<Self, CodecError> {
        Self::read(stream)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// An opaque raw Bitcoin transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BtcTx {
    #[serde(serialize_with = "as_hex")]
    pub raw: Vec<u8>,
}

impl BtcTx {
    pub fn new(raw: Vec<u8>) -> Self {
        Self { raw }
    }

    /// Double SHA-256 of the raw bytes, in wire order
    pub fn id(&self) -> Sha256Hash {
        Sha256Hash::new(double_sha256(&self.raw))
    }
}

impl Encode for BtcTx {
    fn encode<S: ByteSink>(&self, out: &mut S) -> Result<(), CodecError> {
        write_var_len_value(out, &self.raw)
    }
}

impl Decode for BtcTx {
    fn decode(stream: &mut ReadStream<'_>) -> Result<Self, CodecError> {
        Ok(Self::new(read_var_len_value(stream, 0, MAX_RAWTX_SIZE)?.to_vec()))
    }
}

// =============================================================================
// Merkle path
// =============================================================================

/// Proof that `subject` sits at `index` of a Bitcoin merkle tree
///
/// The subject is not on the wire; readers supply it, normally the id of
/// the transaction being proven.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MerklePath {
    pub index: i32,
    pub subject: Sha256Hash,
    pub layers: Vec<Sha256Hash>,
}

impl MerklePath {
    /// Read the unwrapped path body
    pub fn extract(stream: &mut ReadStream<'_>, subject: Sha256Hash) -> Result<Self, CodecError> {
        let index = read_single_i32_be_value(stream)?;
        let num_layers = read_single_i32_be_value(stream)?;
        if num_layers < 0 || num_layers as usize > MAX_LAYER_COUNT_MERKLE {
            return Err(CodecError::ArraySizeExceeded {
                count: num_layers as i64,
                max: MAX_LAYER_COUNT_MERKLE,
            });
        }

        // the size of each bottom leaf, itself a length-prefixed number
        let size_of_size = read_single_i32_be_value(stream)?;
        if !(0..=4).contains(&size_of_size) {
            return Err(CodecError::LengthOutOfRange {
                length: size_of_size as i64,
                min: 0,
                max: 4,
            });
        }
        let mut size_bytes = [0u8; 4];
        size_bytes[4 - size_of_size as usize..].copy_from_slice(stream.read(size_of_size as usize)?);
        let bottom_data_size = i32::from_be_bytes(size_bytes);
        if bottom_data_size != HASH256_SIZE as i32 {
            return Err(CodecError::MerkleFormatMismatch(bottom_data_size));
        }

        let layers = (0..num_layers)
            .map(|_| Sha256Hash::decode(stream))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            index,
            subject,
            layers,
        })
    }

    /// Read a var-len wrapped path
    pub fn read(stream: &mut ReadStream<'_>, subject: Sha256Hash) -> Result<Self, CodecError> {
        let bytes = read_var_len_value(stream, 0, MAX_MERKLE_BYTES)?;
        read_nested(bytes, |inner| Self::extract(inner, subject))
    }

    /// Fold the subject up to the merkle root (double SHA-256 per level)
    pub fn calculate_root(&self) -> Sha256Hash {
        let layers: Vec<[u8; HASH256_SIZE]> = self.layers.iter().map(|l| *l.as_bytes()).collect();
        Sha256Hash::new(fold_merkle_path(
            self.subject.as_bytes(),
            self.index as u32,
            &layers,
            double_sha256,
        ))
    }
}

/// The path body, before it is wrapped in a var-len field
struct MerklePathBody<'a>(&'a MerklePath);

impl Encode for MerklePathBody<'_> {
    fn encode<S: ByteSink>(&self, out: &mut S) -> Result<(), CodecError> {
        let path = self.0;
        write_single_fixed_be_value(out, path.index)?;
        write_single_fixed_be_value(out, path.layers.len() as i32)?;
        write_single_fixed_be_value(out, 4)?;
        out.write_i32_be(HASH256_SIZE as i32)?;
        for layer in &path.layers {
            layer.encode(out)?;
        }
        Ok(())
    }
}

impl Encode for MerklePath {
    fn encode<S: ByteSink>(&self, out: &mut S) -> Result<(), CodecError> {
        write_var_len_value(out, &MerklePathBody(self).to_bytes()?)
    }
}
