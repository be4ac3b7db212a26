//! Key file persistence
//!
//! A key file is a small JSON document holding one key pair in NodeCore
//! export form, its public key and its address. Loading re-derives the
//! public key and address and refuses files where they disagree.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::Address;
use crate::crypto::{KeyError, KeyPair, PrivateKey};
use crate::error::ErrorCategory;

/// Wallet-related errors
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
    #[error("Key file {field} mismatch: stored {stored}, derived {derived}")]
    Mismatch {
        field: &'static str,
        stored: String,
        derived: String,
    },
}

impl WalletError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WalletError::Io(_) | WalletError::Serialization(_) => ErrorCategory::Format,
            WalletError::Key(e) => e.category(),
            WalletError::Mismatch { .. } => ErrorCategory::Validation,
        }
    }
}

/// Serializable key pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFile {
    /// NodeCore export (153 bytes) or a raw 32-byte key, hex
    pub private_key: String,
    /// ASN.1 public key, hex
    pub public_key: String,
    pub address: Address,
}

impl KeyFile {
    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        Self {
            private_key: key_pair.export_nodecore_private_key(),
            public_key: key_pair.public_key().to_hex(),
            address: key_pair.address(),
        }
    }

    /// Rebuild the key pair and check the stored public key and address
    pub fn key_pair(&self) -> Result<KeyPair, WalletError> {
        let bytes = hex::decode(self.private_key.trim()).map_err(KeyError::from)?;
        let key_pair = match KeyPair::from_nodecore_private_key(&bytes) {
            Ok(pair) => pair,
            Err(KeyError::UnknownKeyFormat(_)) => {
                KeyPair::from_private_key(PrivateKey::from_bytes(&bytes)?)
            }
            Err(e) => return Err(e.into()),
        };

        let derived = key_pair.public_key().to_hex();
        if !derived.eq_ignore_ascii_case(self.public_key.trim()) {
            return Err(WalletError::Mismatch {
                field: "public_key",
                stored: self.public_key.clone(),
                derived,
            });
        }

        let derived = key_pair.address();
        if derived != self.address {
            return Err(WalletError::Mismatch {
                field: "address",
                stored: self.address.to_string(),
                derived: derived.to_string(),
            });
        }

        Ok(key_pair)
    }

    /// Save key file to `path`
    pub fn save(&self, path: &Path) -> Result<(), WalletError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::debug!("Saved key file for {} to {}", self.address, path.display());
        Ok(())
    }

    /// Load key file from `path` and return its verified key pair
    pub fn load(path: &Path) -> Result<KeyPair, WalletError> {
        let json = fs::read_to_string(path)?;
        let file: KeyFile = serde_json::from_str(&json)?;
        file.key_pair().map_err(|e| {
            log::warn!("Rejected key file {}: {}", path.display(), e);
            e
        })
    }
}
