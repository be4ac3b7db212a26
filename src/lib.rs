//! vbk-pop: VeriBlock proof-of-proof primitives in Rust
//!
//! This crate provides the client side of VeriBlock PoP publication:
//! - A bounds-checked binary codec for the VeriBlock wire format
//! - Base58/Base59 addresses, standard and multisig
//! - secp256k1 keys and SHA256withECDSA signatures
//! - Transaction assembly, ids and signing
//! - Wire entities: Bitcoin and VeriBlock headers, merkle paths,
//!   publication data, VeriBlock transactions, ATV and VTB
//! - A script interpreter extracting publications from Bitcoin script sigs
//! - A JSON adapter and key file persistence
//!
//! # Example
//!
//! ```rust
//! use vbk_pop::core::{sign_transaction, Address, Coin, TransactionBuilder};
//! use vbk_pop::crypto::KeyPair;
//!
//! // Deterministic key pair from a seed
//! let pair = KeyPair::generate(Some(&[1u8; 32])).unwrap();
//!
//! // Pay 900 units, leaving a fee of 100
//! let destination = Address::parse("V5Ujv72h4jEBcKnALGc4fKqs6CDAPX").unwrap();
//! let tx = TransactionBuilder::new(pair.address(), Coin::new(1000).unwrap())
//!     .add_output(destination, Coin::new(900).unwrap())
//!     .build();
//!
//! let signed = sign_transaction(tx, &pair, 0, None).unwrap();
//! assert_eq!(signed.transaction.transaction_fee, Some(Coin::new(100).unwrap()));
//! assert!(signed.verify().unwrap());
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod core;
pub mod crypto;
pub mod entities;
pub mod error;
pub mod schema;
pub mod script;
pub mod wallet;

// Re-export commonly used types
pub use codec::{CodecError, Decode, Encode, ReadStream, WriteStream};
pub use config::Network;
pub use core::{
    sign_transaction, transaction_id, Address, AddressType, Coin, Output, SignedTransaction,
    Transaction, TransactionBuilder,
};
pub use crypto::{KeyPair, PrivateKey, PublicKey, Sha256WithEcdsa, Signature};
pub use entities::{Atv, BtcBlock, Entity, EntityKind, VbkBlock, VbkPopTx, VbkTx, Vtb};
pub use error::{Error, ErrorCategory, Result};
pub use script::{interpret, parse_btc_script_sig, InterpreterConfig, Publications};
pub use wallet::KeyFile;
