//! Addresses
//!
//! Two families share one 30-character text form:
//! - standard: `'V'`, 24 chars of `base58(sha256(public key))`, 5 checksum chars
//! - multisig: `'V'`, m and n as alphabet symbols, 22 data chars, 4 checksum
//!   chars, and a trailing `'0'`
//!
//! The checksum is always a prefix of `base58(sha256(address data))`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::{
    read_single_byte_len_value, write_single_byte_len_value, ByteSink, CodecError, Decode, Encode,
    ReadStream,
};
use crate::crypto::base58::{self, BaseDecodeError, BASE58_ALPHABET};
use crate::crypto::{base59, sha256, PublicKey};
use crate::error::ErrorCategory;

// =============================================================================
// Constants
// =============================================================================

pub const ADDRESS_SIZE: usize = 30;
pub const STARTING_CHAR: char = 'V';
pub const MULTISIG_ENDING_CHAR: char = '0';

/// Chars of the standard address before its checksum
const ADDRESS_DATA_END: usize = 25;
const STANDARD_CHECKSUM_LENGTH: usize = 5;

const MULTISIG_DATA_LENGTH: usize = 22;
const MULTISIG_CHECKSUM_LENGTH: usize = 4;
pub const MIN_MULTISIG_SIGNERS: usize = 2;
pub const MAX_MULTISIG_SIGNERS: usize = 58;

// =============================================================================
// Errors
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid address length: {0} (expected 30)")]
    InvalidLength(usize),
    #[error("Address must start with 'V'")]
    InvalidPrefix,
    #[error("Address contains characters outside its alphabet")]
    InvalidCharacters,
    #[error("Invalid address checksum")]
    InvalidChecksum,
    #[error("Invalid multisig parameters: {m} of {n}")]
    InvalidMultisigParameters { m: usize, n: usize },
    #[error("Not a standard address: {0}")]
    NotStandard(String),
    #[error("Address decoding failed: {0}")]
    Decode(#[from] BaseDecodeError),
}

impl AddressError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AddressError::InvalidChecksum => ErrorCategory::Checksum,
            AddressError::InvalidMultisigParameters { .. } => ErrorCategory::Semantic,
            _ => ErrorCategory::Format,
        }
    }
}

// =============================================================================
// Address Type
// =============================================================================

/// Address family identifier, also the wire type byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AddressType {
    ZeroUnused = 0,
    Standard = 1,
    ProofOfProof = 2,
    Multisig = 3,
}

impl AddressType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(AddressType::ZeroUnused),
            1 => Some(AddressType::Standard),
            2 => Some(AddressType::ProofOfProof),
            3 => Some(AddressType::Multisig),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

// =============================================================================
// Checksums
// =============================================================================

/// First `length` chars of `checksum`, failing if it is too short
pub fn chop_checksum(checksum: &str, length: usize) -> Result<&str, AddressError> {
    checksum.get(..length).ok_or(AddressError::InvalidChecksum)
}

fn checksum_of(data: &str) -> String {
    base58::encode(&sha256(data.as_bytes()))
}

fn check_checksum(address: &str, data_end: usize, length: usize) -> Result<(), AddressError> {
    let expected = checksum_of(&address[..data_end]);
    if chop_checksum(&expected, length)? != &address[data_end..data_end + length] {
        return Err(AddressError::InvalidChecksum);
    }
    Ok(())
}

fn check_shape(address: &str) -> Result<(), AddressError> {
    if !address.is_ascii() {
        return Err(AddressError::InvalidCharacters);
    }
    if address.len() != ADDRESS_SIZE {
        return Err(AddressError::InvalidLength(address.len()));
    }
    if !address.starts_with(STARTING_CHAR) {
        return Err(AddressError::InvalidPrefix);
    }
    Ok(())
}

fn check_standard(address: &str) -> Result<(), AddressError> {
    check_shape(address)?;
    if !base58::is_base58_string(address) {
        return Err(AddressError::InvalidCharacters);
    }
    check_checksum(address, ADDRESS_DATA_END, STANDARD_CHECKSUM_LENGTH)
}

/// Decode the embedded `(m, n)` of a multisig address
fn multisig_parameters(address: &str) -> Option<(usize, usize)> {
    let mut symbols = address.chars().skip(1);
    let m = BASE58_ALPHABET.find(symbols.next()?)? + 1;
    let n = BASE58_ALPHABET.find(symbols.next()?)? + 1;
    Some((m, n))
}

fn check_multisig(address: &str) -> Result<(), AddressError> {
    check_shape(address)?;
    if !address.ends_with(MULTISIG_ENDING_CHAR) {
        return Err(AddressError::InvalidCharacters);
    }

    let (m, n) = multisig_parameters(address).ok_or(AddressError::InvalidCharacters)?;
    if n < MIN_MULTISIG_SIGNERS || m > n || n > MAX_MULTISIG_SIGNERS {
        return Err(AddressError::InvalidMultisigParameters { m, n });
    }

    // everything but the sentinel must be plain base58
    let body = &address[..ADDRESS_SIZE - 1];
    if base58::decode_unsafe(body).is_none() {
        return Err(AddressError::InvalidCharacters);
    }

    check_checksum(address, ADDRESS_DATA_END, MULTISIG_CHECKSUM_LENGTH)
}

pub fn is_valid_standard_address(address: &str) -> bool {
    check_standard(address).is_ok()
}

pub fn is_valid_multisig_address(address: &str) -> bool {
    check_multisig(address).is_ok()
}

// =============================================================================
// Address
// =============================================================================

/// A standard or multisig address in its text form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Address {
    Standard(String),
    Multisig(String),
}

impl Address {
    /// Validate and classify an address
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        let text = text.trim();
        if text.ends_with(MULTISIG_ENDING_CHAR) {
            check_multisig(text)?;
            Ok(Address::Multisig(text.to_string()))
        } else {
            check_standard(text)?;
            Ok(Address::Standard(text.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Address::Standard(s) | Address::Multisig(s) => s,
        }
    }

    pub fn address_type(&self) -> AddressType {
        match self {
            Address::Standard(_) => AddressType::Standard,
            Address::Multisig(_) => AddressType::Multisig,
        }
    }

    /// Re-run the validity predicate for this address's family
    pub fn is_valid(&self) -> bool {
        match self {
            Address::Standard(s) => is_valid_standard_address(s),
            Address::Multisig(s) => is_valid_multisig_address(s),
        }
    }

    /// The bytes behind the text: base58 for standard, base59 for multisig
    pub fn raw_bytes(&self) -> Result<Vec<u8>, AddressError> {
        let bytes = match self {
            Address::Standard(s) => base58::decode(s)?,
            Address::Multisig(s) => base59::decode(s)?,
        };
        Ok(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        match address {
            Address::Standard(s) | Address::Multisig(s) => s,
        }
    }
}

/// Wire form: `[type id][len: u8][address bytes]`
impl Encode for Address {
    fn encode<S: ByteSink>(&self, out: &mut S) -> Result<(), CodecError> {
        let bytes = self
            .raw_bytes()
            .map_err(|e| CodecError::InvalidAddressEncoding(e.to_string()))?;
        out.write_u8(self.address_type().to_byte())?;
        write_single_byte_len_value(out, &bytes)
    }
}

/// Addresses read off the wire are re-encoded as text, not validated
impl Decode for Address {
    fn decode(stream: &mut ReadStream<'_>) -> Result<Self, CodecError> {
        let type_id = stream.read_u8()?;
        let bytes = read_single_byte_len_value(stream, 0, ADDRESS_SIZE)?;
        match AddressType::from_byte(type_id) {
            Some(AddressType::Standard) => Ok(Address::Standard(base58::encode(bytes))),
            Some(AddressType::Multisig) => Ok(Address::Multisig(base59::encode(bytes))),
            _ => Err(CodecError::UnknownAddressType(type_id)),
        }
    }
}

// =============================================================================
// Derivation
// =============================================================================

/// `'V' + base58(sha256(asn1 public key))[0..24] + checksum`
pub fn address_from_public_key(public_key: &PublicKey) -> Address {
    let mut address = String::with_capacity(ADDRESS_SIZE);
    address.push(STARTING_CHAR);
    address.extend(
        base58::encode(&sha256(&public_key.asn1()))
            .chars()
            .take(ADDRESS_DATA_END - 1),
    );

    let checksum = checksum_of(&address);
    address.extend(checksum.chars().take(STANDARD_CHECKSUM_LENGTH));
    Address::Standard(address)
}

/// Build the m-of-n multisig address for a list of standard signer addresses
pub fn multisig_address_from_addresses(
    addresses: &[Address],
    m: usize,
) -> Result<Address, AddressError> {
    let n = addresses.len();
    if n < MIN_MULTISIG_SIGNERS || n > MAX_MULTISIG_SIGNERS || m < 1 || m > n {
        return Err(AddressError::InvalidMultisigParameters { m, n });
    }

    let mut concatenated = String::with_capacity(n * ADDRESS_SIZE);
    for address in addresses {
        match address {
            Address::Standard(s) if is_valid_standard_address(s) => concatenated.push_str(s),
            other => return Err(AddressError::NotStandard(other.to_string())),
        }
    }

    let alphabet = BASE58_ALPHABET.as_bytes();
    let mut address = String::with_capacity(ADDRESS_SIZE);
    address.push(STARTING_CHAR);
    address.push(alphabet[m - 1] as char);
    address.push(alphabet[n - 1] as char);
    address.extend(
        base58::encode(&sha256(concatenated.as_bytes()))
            .chars()
            .take(MULTISIG_DATA_LENGTH),
    );

    let checksum = checksum_of(&address);
    address.push_str(chop_checksum(&checksum, MULTISIG_CHECKSUM_LENGTH)?);
    address.push(MULTISIG_ENDING_CHAR);

    log::debug!("Derived {}-of-{} multisig address {}", m, n, address);
    Ok(Address::Multisig(address))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLIC_KEY_ASN1: &str = "3056301006072A8648CE3D020106052B8104000A034200044B649515A30A4361DD875F8FAD16C37142116217E5B8069C444773B59911BCCE38782D7BA06C0B9B771305D065279CE9F2288C8EAB5328D260629085F7653504";
    const SIGNERS: [&str; 3] = [
        "V5ZguGxnAckADJMkFFG6Vpr9EGyk6v",
        "V5Ujv72h4jEBcKnALGc4fKqs6CDAPX",
        "V44i36pPHyhaiW695Xg8PEos4G2PrC",
    ];
    const MULTISIG: &str = "V23BXYqpNx3iKSEGGGMEyUNa7CoUM0";

    fn signers() -> Vec<Address> {
        SIGNERS.iter().map(|s| Address::parse(s).unwrap()).collect()
    }

    #[test]
    fn test_address_from_public_key() {
        let key = PublicKey::from_hex(PUBLIC_KEY_ASN1).unwrap();
        let address = address_from_public_key(&key);
        assert_eq!(address.as_str(), "V5ZguGxnAckADJMkFFG6Vpr9EGyk6v");
        assert!(is_valid_standard_address(address.as_str()));
    }

    #[test]
    fn test_standard_address_validation() {
        for signer in SIGNERS {
            assert!(is_valid_standard_address(signer));
            assert!(!is_valid_multisig_address(signer));
        }
        // broken checksum
        assert!(!is_valid_standard_address("V5ZguGxnAckADJMkFFG6Vpr9EGyk6w"));
        // wrong prefix
        assert!(!is_valid_standard_address("X5ZguGxnAckADJMkFFG6Vpr9EGyk6v"));
        assert!(!is_valid_standard_address("V5Zgu"));
        assert!(!is_valid_standard_address(""));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Address::parse("V5ZguGxnAckADJMkFFG6Vpr9EGyk6w").unwrap_err(),
            AddressError::InvalidChecksum
        );
        assert_eq!(
            Address::parse("V5Zgu").unwrap_err(),
            AddressError::InvalidLength(5)
        );
        assert_eq!(
            Address::parse("X5ZguGxnAckADJMkFFG6Vpr9EGyk6v").unwrap_err(),
            AddressError::InvalidPrefix
        );
        assert_eq!(
            AddressError::InvalidChecksum.category(),
            ErrorCategory::Checksum
        );
    }

    #[test]
    fn test_multisig_from_addresses() {
        let address = multisig_address_from_addresses(&signers(), 2).unwrap();
        assert_eq!(address, Address::Multisig(MULTISIG.to_string()));
        assert!(is_valid_multisig_address(MULTISIG));
        assert!(!is_valid_standard_address(MULTISIG));
        assert_eq!(Address::parse(MULTISIG).unwrap(), address);
    }

    #[test]
    fn test_multisig_parameter_bounds() {
        let signers = signers();
        assert_eq!(
            multisig_address_from_addresses(&signers, 4).unwrap_err(),
            AddressError::InvalidMultisigParameters { m: 4, n: 3 }
        );
        assert_eq!(
            multisig_address_from_addresses(&signers[..1], 1).unwrap_err(),
            AddressError::InvalidMultisigParameters { m: 1, n: 1 }
        );
        assert_eq!(
            multisig_address_from_addresses(&signers, 0).unwrap_err(),
            AddressError::InvalidMultisigParameters { m: 0, n: 3 }
        );
    }

    #[test]
    fn test_multisig_rejects_multisig_signer() {
        let mut signers = signers();
        signers.push(Address::Multisig(MULTISIG.to_string()));
        assert!(matches!(
            multisig_address_from_addresses(&signers, 2),
            Err(AddressError::NotStandard(_))
        ));
    }

    #[test]
    fn test_multisig_m_greater_than_n_is_invalid() {
        // swap the m and n symbols: 3-of-2
        let swapped = format!("V32{}", &MULTISIG[3..]);
        assert!(!is_valid_multisig_address(&swapped));
    }

    #[test]
    fn test_chop_checksum() {
        assert_eq!(chop_checksum("abcdef", 4).unwrap(), "abcd");
        assert_eq!(
            chop_checksum("abc", 4).unwrap_err(),
            AddressError::InvalidChecksum
        );
    }

    #[test]
    fn test_wire_form() {
        let standard = Address::parse(SIGNERS[1]).unwrap();
        assert_eq!(
            standard.to_hex().unwrap(),
            "01166772F51AB208D32771AB1506970EEB664462730B838E"
        );
        assert_eq!(
            Address::from_hex("01166772F51AB208D32771AB1506970EEB664462730B838E").unwrap(),
            standard
        );

        let multisig = Address::parse(MULTISIG).unwrap();
        assert_eq!(
            multisig.to_hex().unwrap(),
            "0316A978FF44A3E0EC023AA39B6D67FA618E8EC283C50037"
        );
        assert_eq!(Address::from_bytes(&multisig.to_bytes().unwrap()).unwrap(), multisig);
    }

    #[test]
    fn test_wire_rejects_unknown_type_and_long_address() {
        assert_eq!(
            Address::from_hex("0201AA").unwrap_err(),
            CodecError::UnknownAddressType(2)
        );

        let mut long = vec![0x01, 31];
        long.extend_from_slice(&[1u8; 31]);
        assert!(matches!(
            Address::from_bytes(&long),
            Err(CodecError::LengthOutOfRange { length: 31, .. })
        ));
    }

    #[test]
    fn test_serde_validates() {
        let json = format!("\"{}\"", SIGNERS[0]);
        let address: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(serde_json::to_string(&address).unwrap(), json);
        assert!(serde_json::from_str::<Address>("\"V5ZguGxnAckADJMkFFG6Vpr9EGyk6w\"").is_err());
    }
}
