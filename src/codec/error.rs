//! Errors raised while reading or writing wire-format records

use thiserror::Error;

use crate::error::ErrorCategory;

/// Failures of the binary codec and the entity readers built on it
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("Out of data at position {position}: need {requested} bytes, {remaining} remaining")]
    OutOfData {
        position: usize,
        requested: usize,
        remaining: usize,
    },
    #[error("Buffer overflow at position {position}: writing {requested} bytes, {remaining} remaining")]
    BufferOverflow {
        position: usize,
        requested: usize,
        remaining: usize,
    },
    #[error("Invalid length prefix: {0} length bytes (max: 4)")]
    InvalidLengthPrefix(u8),
    #[error("Length out of range: {length} not in [{min}, {max}]")]
    LengthOutOfRange { length: i64, min: usize, max: usize },
    #[error("Array size exceeded: {count} items (max: {max})")]
    ArraySizeExceeded { count: i64, max: usize },
    #[error("Merkle path format mismatch: bottom data size {0} (expected 32)")]
    MerkleFormatMismatch(i32),
    #[error("Unexpected transaction type: expected {expected:#04x}, found {found:#04x}")]
    UnexpectedTxType { expected: u8, found: u8 },
    #[error("Network byte {0:#04x} collides with a transaction type")]
    ReservedNetworkByte(u8),
    #[error("Unknown address type: {0}")]
    UnknownAddressType(u8),
    #[error("Invalid address encoding: {0}")]
    InvalidAddressEncoding(String),
    #[error("Invalid hash length: {actual} bytes (expected {expected})")]
    InvalidHashLength { expected: usize, actual: usize },
    #[error("Negative amount: {0}")]
    NegativeAmount(i64),
    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl CodecError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CodecError::OutOfData { .. }
            | CodecError::BufferOverflow { .. }
            | CodecError::InvalidLengthPrefix(_)
            | CodecError::LengthOutOfRange { .. }
            | CodecError::ArraySizeExceeded { .. }
            | CodecError::TrailingBytes(_) => ErrorCategory::Bounds,
            CodecError::NegativeAmount(_) => ErrorCategory::Semantic,
            CodecError::MerkleFormatMismatch(_)
            | CodecError::UnexpectedTxType { .. }
            | CodecError::ReservedNetworkByte(_)
            | CodecError::UnknownAddressType(_)
            | CodecError::InvalidAddressEncoding(_)
            | CodecError::InvalidHashLength { .. }
            | CodecError::InvalidHex(_) => ErrorCategory::Format,
        }
    }
}
