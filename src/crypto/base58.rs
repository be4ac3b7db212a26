//! Base58 with the Bitcoin alphabet, used by standard addresses

use thiserror::Error;

pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Failures shared by the base58 and base59 decoders
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BaseDecodeError {
    #[error("Invalid character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("Malformed input: {0}")]
    Malformed(String),
}

pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn decode(input: &str) -> Result<Vec<u8>, BaseDecodeError> {
    bs58::decode(input).into_vec().map_err(|e| match e {
        bs58::decode::Error::InvalidCharacter { character, index } => {
            BaseDecodeError::InvalidCharacter { character, index }
        }
        other => BaseDecodeError::Malformed(other.to_string()),
    })
}

/// Decode, returning `None` instead of an error
pub fn decode_unsafe(input: &str) -> Option<Vec<u8>> {
    decode(input).ok()
}

pub fn is_base58_string(input: &str) -> bool {
    input.chars().all(|c| BASE58_ALPHABET.contains(c))
}
