//! Core payment components
//!
//! This module contains:
//! - Addresses (standard and multisig, text and wire forms)
//! - Coin amounts
//! - Transactions, the signing preimage, and signing

pub mod address;
pub mod amount;
pub mod transaction;

pub use address::{
    address_from_public_key, chop_checksum, is_valid_multisig_address, is_valid_standard_address,
    multisig_address_from_addresses, Address, AddressError, AddressType, ADDRESS_SIZE,
};
pub use amount::Coin;
pub use transaction::{
    serialize_transaction_effects, sign_transaction, transaction_id, Output, SignedTransaction,
    Transaction, TransactionBuilder, TransactionError,
};
