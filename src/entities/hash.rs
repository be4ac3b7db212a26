//! Hash values carried by wire entities

use std::fmt;

use serde::{Serialize, Serializer};

use super::constants::HASH256_SIZE;
use crate::codec::{
    read_single_byte_len_value, write_single_byte_len_value, ByteSink, CodecError, Decode, Encode,
    ReadStream,
};

/// Serialize any byte container as uppercase hex
pub fn as_hex<T: AsRef<[u8]>, S: Serializer>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode_upper(bytes.as_ref()))
}

/// Serialize a list of byte containers as uppercase hex strings
pub fn as_hex_list<T: AsRef<[u8]>, S: Serializer>(
    items: &[T],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(items.iter().map(|item| hex::encode_upper(item.as_ref())))
}

// =============================================================================
// SHA-256 hash
// =============================================================================

/// A full 32-byte SHA-256 hash, kept in wire byte order
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sha256Hash([u8; HASH256_SIZE]);

impl Sha256Hash {
    pub fn new(bytes: [u8; HASH256_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        let array = bytes.try_into().map_err(|_| CodecError::InvalidHashLength {
            expected: HASH256_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(array))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, CodecError> {
        Self::from_slice(&hex::decode(hex_str.trim())?)
    }

    /// Read the 32 raw bytes, with no length prefix
    pub fn extract(stream: &mut ReadStream<'_>) -> Result<Self, CodecError> {
        Ok(Self(stream.read_array()?))
    }

    pub fn as_bytes(&self) -> &[u8; HASH256_SIZE] {
        &self.0
    }

    /// Byte-reversed copy, the order block explorers display
    pub fn reversed(&self) -> Self {
        let mut bytes = self.0;
        bytes.reverse();
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Hash({})", self.to_hex())
    }
}

impl Serialize for Sha256Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        as_hex(&self.0, serializer)
    }
}

/// `[0x20][32 bytes]`
impl Encode for Sha256Hash {
    fn encode<S: ByteSink>(&self, out: &mut S) -> Result<(), CodecError> {
        write_single_byte_len_value(out, &self.0)
    }
}

impl Decode for Sha256Hash {
    fn decode(stream: &mut ReadStream<'_>) -> Result<Self, CodecError> {
        Self::from_slice(read_single_byte_len_value(stream, HASH256_SIZE, HASH256_SIZE)?)
    }
}

// =============================================================================
// VBlake hash
// =============================================================================

/// A VeriBlock block hash, or a fixed-length fragment of one
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct VBlakeHash(Vec<u8>);

impl VBlakeHash {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, CodecError> {
        Ok(Self(hex::decode(hex_str.trim())?))
    }

    /// Read `size` raw bytes
    pub fn extract(stream: &mut ReadStream<'_>, size: usize) -> Result<Self, CodecError> {
        Ok(Self(stream.read(size)?.to_vec()))
    }

    /// Keep the trailing `length` bytes
    pub fn trim(&self, length: usize) -> Result<Self, CodecError> {
        let start = self
            .0
            .len()
            .checked_sub(length)
            .ok_or(CodecError::InvalidHashLength {
                expected: length,
                actual: self.0.len(),
            })?;
        Ok(Self(self.0[start..].to_vec()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.0)
    }
}

impl AsRef<[u8]> for VBlakeHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for VBlakeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for VBlakeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VBlakeHash({})", self.to_hex())
    }
}

impl Serialize for VBlakeHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        as_hex(&self.0, serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hash_length() {
        assert!(Sha256Hash::from_slice(&[0u8; 32]).is_ok());
        assert_eq!(
            Sha256Hash::from_slice(&[0u8; 31]).unwrap_err(),
            CodecError::InvalidHashLength {
                expected: 32,
                actual: 31
            }
        );
    }

    #[test]
    fn test_sha256_hash_wire_and_reverse() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xAB;
        let hash = Sha256Hash::new(bytes);

        let wire = hash.to_bytes().unwrap();
        assert_eq!(wire.len(), 33);
        assert_eq!(wire[0], 0x20);
        assert_eq!(Sha256Hash::from_bytes(&wire).unwrap(), hash);
        assert_eq!(hash.reversed().as_bytes()[31], 0xAB);
    }

    #[test]
    fn test_vblake_trim_keeps_tail() {
        let hash = VBlakeHash::from_hex("000102030405060708090A0B0C0D0E0F1011121314151617").unwrap();
        assert_eq!(hash.len(), 24);
        assert_eq!(hash.trim(9).unwrap().to_hex(), "0F1011121314151617");
        assert_eq!(
            hash.trim(25).unwrap_err(),
            CodecError::InvalidHashLength {
                expected: 25,
                actual: 24
            }
        );
    }

    #[test]
    fn test_serialize_as_hex() {
        let hash = VBlakeHash::new(vec![0xde, 0xad]);
        assert_eq!(serde_json::to_string(&hash).unwrap(), "\"DEAD\"");
    }
}
