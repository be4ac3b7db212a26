//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 and double SHA-256 hashing
//! - Base58 and Base59 text encodings
//! - secp256k1 keys and SHA256withECDSA signatures
//! - Merkle path folding

pub mod base58;
pub mod base59;
pub mod hash;
pub mod keys;
pub mod merkle;
pub mod signature;

pub use base58::BaseDecodeError;
pub use hash::{double_sha256, sha256, sha256_hex, SHA256_SIZE};
pub use keys::{KeyError, KeyPair, PrivateKey, PublicKey};
pub use merkle::{calculate_merkle_root, fold_merkle_path, merkle_path_layers, Hash32};
pub use signature::{Sha256WithEcdsa, Signature};
