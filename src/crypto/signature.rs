//! ECDSA signatures and the SHA256withECDSA scheme
//!
//! A signature arrives either as 64 compact bytes (`r || s`) or as an ASN.1
//! DER sequence of up to 72 bytes. Both forms convert into each other
//! without loss.

use secp256k1::ecdsa::Signature as EcSignature;
use secp256k1::{Message, Secp256k1};

use super::hash::sha256;
use super::keys::{KeyError, PrivateKey, PublicKey};

pub const SIGNATURE_COMPACT_SIZE: usize = 64;
pub const MAX_SIGNATURE_DER_SIZE: usize = 72;

/// A secp256k1 ECDSA signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    inner: EcSignature,
}

impl Signature {
    /// Accepts the 64-byte compact form or a DER sequence
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let inner = match bytes.len() {
            SIGNATURE_COMPACT_SIZE => {
                EcSignature::from_compact(bytes).map_err(|_| KeyError::InvalidSignature)?
            }
            8..=MAX_SIGNATURE_DER_SIZE => return Self::from_der(bytes),
            other => return Err(KeyError::UnknownSignatureFormat(other)),
        };
        Ok(Self { inner })
    }

    /// Accepts only a DER sequence, whatever its length
    pub fn from_der(bytes: &[u8]) -> Result<Self, KeyError> {
        if !(8..=MAX_SIGNATURE_DER_SIZE).contains(&bytes.len()) {
            return Err(KeyError::UnknownSignatureFormat(bytes.len()));
        }
        let inner = EcSignature::from_der(bytes).map_err(|_| KeyError::InvalidSignature)?;
        Ok(Self { inner })
    }

    pub fn from_hex(hex_sig: &str) -> Result<Self, KeyError> {
        Self::from_bytes(&hex::decode(hex_sig.trim())?)
    }

    pub fn compact(&self) -> [u8; SIGNATURE_COMPACT_SIZE] {
        self.inner.serialize_compact()
    }

    pub fn der(&self) -> Vec<u8> {
        self.inner.serialize_der().to_vec()
    }

    /// Uppercase hex of the DER form
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.der())
    }
}

/// SHA-256 the message, then sign or verify the digest
pub struct Sha256WithEcdsa;

impl Sha256WithEcdsa {
    pub fn sign(message: &[u8], key: &PrivateKey) -> Result<Signature, KeyError> {
        let digest = Message::from_digest_slice(&sha256(message))?;
        let secp = Secp256k1::signing_only();
        Ok(Signature {
            inner: secp.sign_ecdsa(&digest, key.secret_key()),
        })
    }

    /// High-S signatures are normalised before checking
    pub fn verify(message: &[u8], signature: &Signature, key: &PublicKey) -> bool {
        let digest = match Message::from_digest_slice(&sha256(message)) {
            Ok(digest) => digest,
            Err(_) => return false,
        };

        let mut normalized = signature.inner;
        normalized.normalize_s();

        let secp = Secp256k1::verification_only();
        secp.verify_ecdsa(&digest, &normalized, key.ec_key()).is_ok()
    }
}
