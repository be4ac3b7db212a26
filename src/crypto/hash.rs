//! SHA-256 hashing helpers
//!
//! Transaction ids, address checksums and Bitcoin block hashes are all
//! built from these.

use sha2::{Digest, Sha256};

/// Size of a SHA-256 digest in bytes
pub const SHA256_SIZE: usize = 32;

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> [u8; SHA256_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
/// Used for Bitcoin block and transaction hashes
pub fn double_sha256(data: &[u8]) -> [u8; SHA256_SIZE] {
    sha256(&sha256(data))
}

/// Computes SHA-256 hash and returns it as an uppercase hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode_upper(sha256(data))
}
