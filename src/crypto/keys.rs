//! ECDSA key management
//!
//! Keys arrive in several encodings and are normalised on construction:
//! - private keys: raw 32 bytes, ASN.1 wrapped (64 bytes), or the NodeCore
//!   export form `0x40 || asn1 private || asn1 public` (153 bytes)
//! - public keys: compressed (33), uncompressed (65) or ASN.1 wrapped (88)
//!
//! All keys live on the secp256k1 curve.

use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{PublicKey as EcPublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::hash::sha256;
use super::signature::{Sha256WithEcdsa, Signature};
use crate::core::address::{address_from_public_key, Address};
use crate::error::ErrorCategory;

// =============================================================================
// Key Constants
// =============================================================================

/// DER header in front of an uncompressed public key
pub const PUBKEY_ASN1_PREFIX: [u8; 23] = [
    0x30, 0x56, 0x30, 0x10, 0x06, 0x07, 0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x02, 0x01, 0x06, 0x05,
    0x2B, 0x81, 0x04, 0x00, 0x0A, 0x03, 0x42, 0x00,
];

/// DER header in front of a raw private key
pub const PRIVKEY_ASN1_PREFIX: [u8; 32] = [
    0x30, 0x3E, 0x02, 0x01, 0x00, 0x30, 0x10, 0x06, 0x07, 0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x02,
    0x01, 0x06, 0x05, 0x2B, 0x81, 0x04, 0x00, 0x0A, 0x04, 0x27, 0x30, 0x25, 0x02, 0x01, 0x01,
    0x04, 0x20,
];

/// First byte of a NodeCore private key export
pub const NODECORE_PRIVATE_KEY_PREFIX: u8 = 0x40;

pub const PRIVATE_KEY_SIZE: usize = 32;
pub const PRIVATE_KEY_ASN1_SIZE: usize = PRIVKEY_ASN1_PREFIX.len() + PRIVATE_KEY_SIZE;
pub const NODECORE_PRIVATE_KEY_SIZE: usize = 1 + PRIVATE_KEY_ASN1_SIZE + PUBLIC_KEY_ASN1_SIZE;

pub const PUBLIC_KEY_COMPRESSED_SIZE: usize = 33;
pub const PUBLIC_KEY_UNCOMPRESSED_SIZE: usize = 65;
pub const PUBLIC_KEY_ASN1_SIZE: usize = PUBKEY_ASN1_PREFIX.len() + PUBLIC_KEY_UNCOMPRESSED_SIZE;

/// Minimum seed length accepted by `KeyPair::generate`
pub const MIN_ENTROPY_SIZE: usize = 32;

// =============================================================================
// Key Errors
// =============================================================================

/// Errors that can occur during key and signature operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeyError {
    #[error("Unknown key format: {0} bytes")]
    UnknownKeyFormat(usize),
    #[error("Unknown signature format: {0} bytes")]
    UnknownSignatureFormat(usize),
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Embedded public key does not match the private key")]
    PublicKeyMismatch,
    #[error("Insufficient entropy: {0} bytes (min: 32)")]
    InsufficientEntropy(usize),
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl KeyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            KeyError::InsufficientEntropy(_) => ErrorCategory::Semantic,
            _ => ErrorCategory::Format,
        }
    }
}

// =============================================================================
// Private Key
// =============================================================================

/// A secp256k1 private key, always 32 bytes internally
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    secret: SecretKey,
}

impl PrivateKey {
    /// Accepts raw, ASN.1 wrapped or NodeCore encodings
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let raw = match bytes.len() {
            PRIVATE_KEY_SIZE => bytes,
            PRIVATE_KEY_ASN1_SIZE => bytes.strip_prefix(&PRIVKEY_ASN1_PREFIX[..])
                .ok_or(KeyError::InvalidPrivateKey)?,
            NODECORE_PRIVATE_KEY_SIZE => {
                let (private, _) = split_nodecore(bytes)?;
                private.strip_prefix(&PRIVKEY_ASN1_PREFIX[..]).ok_or(KeyError::InvalidPrivateKey)?
            }
            other => return Err(KeyError::UnknownKeyFormat(other)),
        };

        let secret = SecretKey::from_slice(raw).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self { secret })
    }

    pub fn from_hex(hex_key: &str) -> Result<Self, KeyError> {
        Self::from_bytes(&hex::decode(hex_key.trim())?)
    }

    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_SIZE] {
        self.secret.secret_bytes()
    }

    /// 64-byte ASN.1 form
    pub fn to_asn1(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PRIVATE_KEY_ASN1_SIZE);
        out.extend_from_slice(&PRIVKEY_ASN1_PREFIX);
        out.extend_from_slice(&self.secret.secret_bytes());
        out
    }

    /// Derive the matching public key
    pub fn public_key(&self) -> PublicKey {
        let secp = Secp256k1::signing_only();
        PublicKey {
            key: EcPublicKey::from_secret_key(&secp, &self.secret),
        }
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.secret
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

// =============================================================================
// Public Key
// =============================================================================

/// A secp256k1 public key; its canonical form is the 88-byte ASN.1 encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    key: EcPublicKey,
}

impl PublicKey {
    /// Accepts compressed, uncompressed or ASN.1 wrapped encodings
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let point = match bytes.len() {
            PUBLIC_KEY_ASN1_SIZE => {
                bytes.strip_prefix(&PUBKEY_ASN1_PREFIX[..]).ok_or(KeyError::InvalidPublicKey)?
            }
            PUBLIC_KEY_UNCOMPRESSED_SIZE | PUBLIC_KEY_COMPRESSED_SIZE => bytes,
            other => return Err(KeyError::UnknownKeyFormat(other)),
        };

        let key = EcPublicKey::from_slice(point).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { key })
    }

    pub fn from_hex(hex_key: &str) -> Result<Self, KeyError> {
        Self::from_bytes(&hex::decode(hex_key.trim())?)
    }

    /// 88-byte ASN.1 form
    pub fn asn1(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PUBLIC_KEY_ASN1_SIZE);
        out.extend_from_slice(&PUBKEY_ASN1_PREFIX);
        out.extend_from_slice(&self.key.serialize_uncompressed());
        out
    }

    pub fn uncompressed(&self) -> [u8; PUBLIC_KEY_UNCOMPRESSED_SIZE] {
        self.key.serialize_uncompressed()
    }

    pub fn compressed(&self) -> [u8; PUBLIC_KEY_COMPRESSED_SIZE] {
        self.key.serialize()
    }

    /// Uppercase hex of the ASN.1 form
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.asn1())
    }

    /// Standard address owned by this key
    pub fn address(&self) -> Address {
        address_from_public_key(self)
    }

    pub(crate) fn ec_key(&self) -> &EcPublicKey {
        &self.key
    }
}

// =============================================================================
// Key Pair
// =============================================================================

/// A private key with the public key derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generate a key pair whose private key is `sha256(entropy)`
    ///
    /// Without entropy 32 bytes are drawn from the OS generator; a supplied
    /// seed must be at least 32 bytes and always yields the same pair.
    pub fn generate(entropy: Option<&[u8]>) -> Result<Self, KeyError> {
        let seed = match entropy {
            Some(seed) if seed.len() < MIN_ENTROPY_SIZE => {
                return Err(KeyError::InsufficientEntropy(seed.len()))
            }
            Some(seed) => seed.to_vec(),
            None => {
                let mut seed = vec![0u8; MIN_ENTROPY_SIZE];
                OsRng.fill_bytes(&mut seed);
                seed
            }
        };

        let private_key = PrivateKey::from_bytes(&sha256(&seed))?;
        Ok(Self::from_private_key(private_key))
    }

    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }

    /// Import a NodeCore export, checking the embedded public key
    pub fn from_nodecore_private_key(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != NODECORE_PRIVATE_KEY_SIZE {
            return Err(KeyError::UnknownKeyFormat(bytes.len()));
        }
        let (_, public) = split_nodecore(bytes)?;
        let pair = Self::from_private_key(PrivateKey::from_bytes(bytes)?);
        if pair.public_key != PublicKey::from_bytes(public)? {
            return Err(KeyError::PublicKeyMismatch);
        }
        Ok(pair)
    }

    /// Uppercase hex of `0x40 || asn1 private key || asn1 public key`
    pub fn export_nodecore_private_key(&self) -> String {
        let mut out = Vec::with_capacity(NODECORE_PRIVATE_KEY_SIZE);
        out.push(NODECORE_PRIVATE_KEY_PREFIX);
        out.extend_from_slice(&self.private_key.to_asn1());
        out.extend_from_slice(&self.public_key.asn1());
        hex::encode_upper(out)
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn address(&self) -> Address {
        self.public_key.address()
    }

    /// SHA256withECDSA signature over `message`
    pub fn sign(&self, message: &[u8]) -> Result<Signature, KeyError> {
        Sha256WithEcdsa::sign(message, &self.private_key)
    }

    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        Sha256WithEcdsa::verify(message, signature, &self.public_key)
    }
}

/// Split a NodeCore export into its ASN.1 private and public parts
fn split_nodecore(bytes: &[u8]) -> Result<(&[u8], &[u8]), KeyError> {
    match bytes.split_first() {
        Some((&NODECORE_PRIVATE_KEY_PREFIX, rest)) => Ok(rest.split_at(PRIVATE_KEY_ASN1_SIZE)),
        _ => Err(KeyError::InvalidPrivateKey),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_KEY_ASN1: &str = "303E020100301006072A8648CE3D020106052B8104000A04273025020101042017869E398A7ACD18729B8FC6D47DCFE9C1A2B5871334D00471EFC3985762FF8F";
    const PUBLIC_KEY_ASN1: &str = "3056301006072A8648CE3D020106052B8104000A034200044B649515A30A4361DD875F8FAD16C37142116217E5B8069C444773B59911BCCE38782D7BA06C0B9B771305D065279CE9F2288C8EAB5328D260629085F7653504";

    #[test]
    fn test_private_key_encodings() {
        let asn1 = PrivateKey::from_hex(PRIVATE_KEY_ASN1).unwrap();
        let raw = PrivateKey::from_bytes(&asn1.to_bytes()).unwrap();
        assert_eq!(asn1, raw);
        assert_eq!(hex::encode_upper(raw.to_asn1()), PRIVATE_KEY_ASN1);
        assert_eq!(asn1.public_key().to_hex(), PUBLIC_KEY_ASN1);
    }

    #[test]
    fn test_unknown_key_format() {
        assert_eq!(
            PrivateKey::from_bytes(&[1u8; 31]).unwrap_err(),
            KeyError::UnknownKeyFormat(31)
        );
        assert_eq!(
            PublicKey::from_bytes(&[4u8; 64]).unwrap_err(),
            KeyError::UnknownKeyFormat(64)
        );
    }

    #[test]
    fn test_public_key_encodings() {
        let key = PublicKey::from_hex(PUBLIC_KEY_ASN1).unwrap();
        assert_eq!(
            hex::encode(key.compressed()),
            "024b649515a30a4361dd875f8fad16c37142116217e5b8069c444773b59911bcce"
        );
        assert_eq!(PublicKey::from_bytes(&key.uncompressed()).unwrap(), key);
        assert_eq!(PublicKey::from_bytes(&key.compressed()).unwrap(), key);
    }

    #[test]
    fn test_decompress_even_and_odd() {
        let even = PublicKey::from_hex(
            "024b649515a30a4361dd875f8fad16c37142116217e5b8069c444773b59911bc66",
        )
        .unwrap();
        assert!(even
            .to_hex()
            .ends_with("BC66B94F4E34A03B943E2E2608A60F3FB708244419D0D4E85373D97A1EAA0D349E60"));

        let odd = PublicKey::from_hex(
            "034b649515a30a4361dd875f8fad16c37142116217e5b8069c444773b59911bc67",
        )
        .unwrap();
        assert!(odd
            .to_hex()
            .ends_with("BC671717216C6A878216F47A9083A0E4EB4AD592037C520BA65C449DF687448D39F9"));
    }

    #[test]
    fn test_generate_with_seed_is_deterministic() {
        let seed = [7u8; 32];
        let a = KeyPair::generate(Some(&seed)).unwrap();
        let b = KeyPair::generate(Some(&seed)).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            hex::encode_upper(a.private_key().to_bytes()),
            "4BB06F8E4E3A7715D201D573D0AA423762E55DABD61A2C02278FA56CC6D294E0"
        );
        assert_eq!(a.address().as_str(), "V7EmfZwFAXQ1ocFWW6FHTPSGP6HYy2");
    }

    #[test]
    fn test_generate_without_seed() {
        let a = KeyPair::generate(None).unwrap();
        let b = KeyPair::generate(None).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.private_key().public_key(), *a.public_key());
    }

    #[test]
    fn test_insufficient_entropy() {
        assert_eq!(
            KeyPair::generate(Some(&[1u8; 31])).unwrap_err(),
            KeyError::InsufficientEntropy(31)
        );
    }

    #[test]
    fn test_nodecore_round_trip() {
        let nodecore = "40303E020100301006072A8648CE3D020106052B8104000A0427302502010104205E5356079422753D981D93BDEBF7DE38D4AB063A73540DB50F446D4F4618684C3056301006072A8648CE3D020106052B8104000A0342000461CA7B88C1B097CE7D72860C05D50AF154C63D112E149EE4A36F51E12D960C9065CAFE6CD9D11B54F03DB1A2A82A374E0357C9C63A2D6A1D1C9DF4C889910CAA";
        let pair = KeyPair::from_nodecore_private_key(&hex::decode(nodecore).unwrap()).unwrap();
        assert_eq!(pair.address().as_str(), "V3kHRaCL6ddmqMRnCSyD8417Z9nJCZ");
        assert_eq!(pair.export_nodecore_private_key(), nodecore);
    }

    #[test]
    fn test_nodecore_public_key_mismatch() {
        let pair = KeyPair::generate(Some(&[9u8; 32])).unwrap();
        let other = KeyPair::generate(Some(&[8u8; 32])).unwrap();

        let mut bytes = vec![NODECORE_PRIVATE_KEY_PREFIX];
        bytes.extend_from_slice(&pair.private_key().to_asn1());
        bytes.extend_from_slice(&other.public_key().asn1());
        assert_eq!(
            KeyPair::from_nodecore_private_key(&bytes).unwrap_err(),
            KeyError::PublicKeyMismatch
        );
    }

    #[test]
    fn test_testnet_key_address() {
        let key = PrivateKey::from_hex("303e020100301006072a8648ce3d020106052b8104000a042730250201010420034074f049a8b84774ad432c379e22df7b7a9b48ebb3b3c238f6aad6b8249b09").unwrap();
        assert_eq!(key.public_key().address().as_str(), "V9Jr1bqi57NzCkfSEJ5mRzW5NA2cQw");
    }
}
