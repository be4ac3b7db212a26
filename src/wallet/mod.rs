//! Wallet module for key file management

pub mod keyfile;

pub use keyfile::{KeyFile, WalletError};
