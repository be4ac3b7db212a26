//! Crate-wide error type
//!
//! Every module keeps its own error enum; `Error` wraps them so callers can
//! use one `Result` and still ask which class of failure they hit.

use thiserror::Error;

use crate::codec::CodecError;
use crate::core::address::AddressError;
use crate::core::transaction::TransactionError;
use crate::crypto::KeyError;
use crate::schema::ValidationErrors;
use crate::script::ScriptError;
use crate::wallet::WalletError;

/// Broad failure classes shared by all module errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Unrecognised key, signature, address or record encoding
    Format,
    /// Out of data, overflow, or a size outside its ceiling
    Bounds,
    /// Address checksum mismatch
    Checksum,
    /// Well-formed input that breaks a rule (funds, ATV count, stack depth)
    Semantic,
    /// External JSON object rejected by the schema adapter
    Validation,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCategory::Format => "format",
            ErrorCategory::Bounds => "bounds",
            ErrorCategory::Checksum => "checksum",
            ErrorCategory::Semantic => "semantic",
            ErrorCategory::Validation => "validation",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Codec(e) => e.category(),
            Error::Address(e) => e.category(),
            Error::Key(e) => e.category(),
            Error::Transaction(e) => e.category(),
            Error::Script(e) => e.category(),
            Error::Validation(_) => ErrorCategory::Validation,
            Error::Wallet(e) => e.category(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
