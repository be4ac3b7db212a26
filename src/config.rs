//! Network parameters
//!
//! Mainnet transactions carry no network byte; every other network prefixes
//! the transaction type with its own byte.

use std::fmt;
use std::str::FromStr;

use crate::entities::TxType;

/// Network byte used by the public testnet
pub const TESTNET_NETWORK_BYTE: u8 = 0xAA;

/// Whether `byte` reads as a transaction type and so cannot be a network byte
pub fn is_reserved_network_byte(byte: u8) -> bool {
    byte == TxType::VbkTx.to_byte() || byte == TxType::VbkPopTx.to_byte()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    /// Any other network, identified by its byte
    Custom(u8),
}

impl Network {
    pub fn network_byte(&self) -> Option<u8> {
        match self {
            Network::Mainnet => None,
            Network::Testnet => Some(TESTNET_NETWORK_BYTE),
            Network::Custom(byte) => Some(*byte),
        }
    }

    pub fn from_network_byte(byte: Option<u8>) -> Self {
        match byte {
            None => Network::Mainnet,
            Some(TESTNET_NETWORK_BYTE) => Network::Testnet,
            Some(other) => Network::Custom(other),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
            Network::Custom(byte) => write!(f, "{:#04x}", byte),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    /// Accepts `mainnet`, `testnet`, or a byte as decimal or `0x` hex
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "mainnet" | "main" => return Ok(Network::Mainnet),
            "testnet" | "test" => return Ok(Network::Testnet),
            _ => {}
        }

        let byte = match s.strip_prefix("0x") {
            Some(hex_byte) => u8::from_str_radix(hex_byte, 16),
            None => s.parse::<u8>(),
        }
        .map_err(|_| format!("Unknown network: {}", s))?;
        if is_reserved_network_byte(byte) {
            return Err(format!("Network byte {:#04x} is a transaction type", byte));
        }

        Ok(Network::from_network_byte(Some(byte)))
    }
}
