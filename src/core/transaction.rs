//! Transaction assembly and signing
//!
//! A transaction starts unsigned: its type, fee and id are unknown. Signing
//! fills them in, hashes the signing preimage into the id and signs that id.
//!
//! Preimage layout:
//! - optional network byte, then the type byte
//! - source address record and source amount
//! - output count (one byte) and each output
//! - signature index, then `data` as a var-len field

use serde::Serialize;
use thiserror::Error;

use super::address::{Address, AddressType};
use super::amount::Coin;
use crate::codec::{
    write_single_be_value, write_var_len_value, ByteSink, CodecError, Decode, Encode, ReadStream,
};
use crate::config::is_reserved_network_byte;
use crate::crypto::{sha256, KeyError, KeyPair, PublicKey, Sha256WithEcdsa, Signature};
use crate::entities::constants::MAX_OUTPUTS_COUNT;
use crate::entities::Sha256Hash;
use crate::error::ErrorCategory;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransactionError {
    #[error("Insufficient funds: spending {required} of {available}")]
    InsufficientFunds { available: Coin, required: Coin },
    #[error("Unsupported source address: {0}")]
    UnsupportedAddressType(String),
    #[error("Negative signature index: {0}")]
    NegativeSignatureIndex(i64),
    #[error("Too many outputs: {0} (max: 255)")]
    TooManyOutputs(usize),
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
}

impl TransactionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TransactionError::TooManyOutputs(_) => ErrorCategory::Bounds,
            TransactionError::Codec(e) => e.category(),
            TransactionError::Key(e) => e.category(),
            _ => ErrorCategory::Semantic,
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// A transaction destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Output {
    pub address: Address,
    pub amount: Coin,
}

impl Output {
    pub fn new(address: Address, amount: Coin) -> Self {
        Self { address, amount }
    }
}

impl Encode for Output {
    fn encode<S: ByteSink>(&self, out: &mut S) -> Result<(), CodecError> {
        self.address.encode(out)?;
        self.amount.encode(out)
    }
}

impl Decode for Output {
    fn decode(stream: &mut ReadStream<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            address: Address::decode(stream)?,
            amount: Coin::decode(stream)?,
        })
    }
}

/// `[count: u8][outputs]`
pub(crate) fn write_outputs<S: ByteSink>(out: &mut S, outputs: &[Output]) -> Result<(), CodecError> {
    if outputs.len() > MAX_OUTPUTS_COUNT {
        return Err(CodecError::LengthOutOfRange {
            length: outputs.len() as i64,
            min: 0,
            max: MAX_OUTPUTS_COUNT,
        });
    }
    out.write_u8(outputs.len() as u8)?;
    for output in outputs {
        output.encode(out)?;
    }
    Ok(())
}

// =============================================================================
// Transaction
// =============================================================================

/// A payment from one source address to a list of outputs
///
/// `tx_type`, `transaction_fee` and `tx_id` stay `None` until signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub tx_type: Option<AddressType>,
    pub source_address: Address,
    pub source_amount: Coin,
    pub outputs: Vec<Output>,
    pub transaction_fee: Option<Coin>,
    pub data: Option<Vec<u8>>,
    pub tx_id: Option<Sha256Hash>,
    pub network_byte: Option<u8>,
}

impl Transaction {
    pub fn new(source_address: Address, source_amount: Coin, outputs: Vec<Output>) -> Self {
        Self {
            tx_type: None,
            source_address,
            source_amount,
            outputs,
            transaction_fee: None,
            data: None,
            tx_id: None,
            network_byte: None,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.tx_id.is_some()
    }

    /// Sum of all output amounts, saturating at `Coin::MAX`
    pub fn total_output(&self) -> Coin {
        self.outputs
            .iter()
            .fold(Coin::ZERO, |total, output| total.saturating_add(output.amount))
    }

    /// `source_amount - total_output`, failing when outputs spend more
    pub fn calculate_fee(&self) -> Result<Coin, TransactionError> {
        // summed wide so an output total past i64 still compares as overspending
        let total: i128 = self
            .outputs
            .iter()
            .map(|output| i128::from(output.amount.atomic_units()))
            .sum();
        if total > i128::from(self.source_amount.atomic_units()) {
            return Err(TransactionError::InsufficientFunds {
                available: self.source_amount,
                required: self.total_output(),
            });
        }
        Ok(self
            .source_amount
            .checked_sub(self.total_output())
            .unwrap_or(Coin::ZERO))
    }
}

/// Builder for unsigned transactions
pub struct TransactionBuilder {
    source_address: Address,
    source_amount: Coin,
    outputs: Vec<Output>,
    data: Option<Vec<u8>>,
    network_byte: Option<u8>,
}

impl TransactionBuilder {
    pub fn new(source_address: Address, source_amount: Coin) -> Self {
        Self {
            source_address,
            source_amount,
            outputs: Vec::new(),
            data: None,
            network_byte: None,
        }
    }

    pub fn add_output(mut self, address: Address, amount: Coin) -> Self {
        self.outputs.push(Output::new(address, amount));
        self
    }

    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn network_byte(mut self, network_byte: Option<u8>) -> Self {
        self.network_byte = network_byte;
        self
    }

    pub fn build(self) -> Transaction {
        Transaction {
            data: self.data,
            network_byte: self.network_byte,
            ..Transaction::new(self.source_address, self.source_amount, self.outputs)
        }
    }
}

// =============================================================================
// Signing preimage
// =============================================================================

struct SigningPreimage<'a> {
    tx: &'a Transaction,
    tx_type: AddressType,
    signature_index: i64,
}

impl Encode for SigningPreimage<'_> {
    fn encode<S: ByteSink>(&self, out: &mut S) -> Result<(), CodecError> {
        let tx = self.tx;
        if let Some(network_byte) = tx.network_byte {
            if is_reserved_network_byte(network_byte) {
                return Err(CodecError::ReservedNetworkByte(network_byte));
            }
            out.write_u8(network_byte)?;
        }
        out.write_u8(self.tx_type.to_byte())?;
        tx.source_address.encode(out)?;
        tx.source_amount.encode(out)?;
        write_outputs(out, &tx.outputs)?;
        write_single_be_value(out, self.signature_index)?;
        write_var_len_value(out, tx.data.as_deref().unwrap_or_default())
    }
}

/// The exact bytes whose hash is the transaction id
///
/// An unsigned transaction takes its type from the source address family.
pub fn serialize_transaction_effects(
    tx: &Transaction,
    signature_index: i64,
) -> Result<Vec<u8>, TransactionError> {
    if tx.outputs.len() > MAX_OUTPUTS_COUNT {
        return Err(TransactionError::TooManyOutputs(tx.outputs.len()));
    }
    let preimage = SigningPreimage {
        tx,
        tx_type: tx.tx_type.unwrap_or(tx.source_address.address_type()),
        signature_index,
    };
    Ok(preimage.to_bytes()?)
}

/// `sha256(serialize_transaction_effects(tx, signature_index))`
pub fn transaction_id(tx: &Transaction, signature_index: i64) -> Result<Sha256Hash, TransactionError> {
    Ok(Sha256Hash::new(sha256(&serialize_transaction_effects(
        tx,
        signature_index,
    )?)))
}

// =============================================================================
// Signing
// =============================================================================

/// A transaction together with the signature over its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub signature: Signature,
    pub public_key: PublicKey,
    pub signature_index: i64,
    pub transaction: Transaction,
}

impl SignedTransaction {
    /// Re-derive fee and id, then check the signature and key ownership
    pub fn verify(&self) -> Result<bool, TransactionError> {
        let tx = &self.transaction;
        if tx.transaction_fee != Some(tx.calculate_fee()?) {
            return Ok(false);
        }

        let id = transaction_id(tx, self.signature_index)?;
        if tx.tx_id != Some(id) {
            return Ok(false);
        }

        if let Address::Standard(_) = tx.source_address {
            if self.public_key.address() != tx.source_address {
                return Ok(false);
            }
        }

        Ok(Sha256WithEcdsa::verify(
            id.as_bytes(),
            &self.signature,
            &self.public_key,
        ))
    }
}

/// Fill in type, fee, data and id, then sign the id
///
/// `network_byte`, when given, replaces the one on the transaction.
pub fn sign_transaction(
    mut tx: Transaction,
    key_pair: &KeyPair,
    signature_index: i64,
    network_byte: Option<u8>,
) -> Result<SignedTransaction, TransactionError> {
    if signature_index < 0 {
        return Err(TransactionError::NegativeSignatureIndex(signature_index));
    }
    if !tx.source_address.is_valid() {
        return Err(TransactionError::UnsupportedAddressType(
            tx.source_address.to_string(),
        ));
    }

    let fee = tx.calculate_fee()?;
    tx.transaction_fee = Some(fee);
    tx.data.get_or_insert_with(Vec::new);
    tx.tx_type = Some(tx.source_address.address_type());
    if network_byte.is_some() {
        tx.network_byte = network_byte;
    }

    let id = transaction_id(&tx, signature_index)?;
    tx.tx_id = Some(id);
    let signature = key_pair.sign(id.as_bytes())?;

    log::debug!(
        "Signed transaction {} from {} (fee {}, index {})",
        id,
        tx.source_address,
        fee,
        signature_index
    );

    Ok(SignedTransaction {
        signature,
        public_key: *key_pair.public_key(),
        signature_index,
        transaction: tx,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PrivateKey;

    const PRIVATE_KEY_ASN1: &str = "303E020100301006072A8648CE3D020106052B8104000A04273025020101042017869E398A7ACD18729B8FC6D47DCFE9C1A2B5871334D00471EFC3985762FF8F";
    const SOURCE: &str = "V5ZguGxnAckADJMkFFG6Vpr9EGyk6v";
    const DESTINATION: &str = "V5Ujv72h4jEBcKnALGc4fKqs6CDAPX";
    const PREIMAGE: &str = "01011667745844A4AE80E118D1C195A9C992BFE2FD0CC673B304060093480101166772F51AB208D32771AB1506970EEB664462730B838E0405F5E10001000100";

    fn key_pair() -> KeyPair {
        KeyPair::from_private_key(PrivateKey::from_hex(PRIVATE_KEY_ASN1).unwrap())
    }

    fn coin(units: i64) -> Coin {
        Coin::new(units).unwrap()
    }

    fn sample_tx() -> Transaction {
        TransactionBuilder::new(Address::parse(SOURCE).unwrap(), coin(100_701_000))
            .add_output(Address::parse(DESTINATION).unwrap(), coin(100_000_000))
            .build()
    }

    #[test]
    fn test_unsigned_transaction() {
        let tx = sample_tx();
        assert!(!tx.is_signed());
        assert!(tx.tx_type.is_none());
        assert!(tx.transaction_fee.is_none());
    }

    #[test]
    fn test_signing_preimage() {
        let tx = sample_tx();
        let preimage = serialize_transaction_effects(&tx, 0).unwrap();
        assert_eq!(hex::encode_upper(&preimage), PREIMAGE);
        assert_eq!(
            transaction_id(&tx, 0).unwrap().to_hex(),
            "73087AD644B817F638EA3423A9106CCC1398C67EF94D247B8A8B34E4A16F592A"
        );
    }

    #[test]
    fn test_network_byte_prefixes_preimage() {
        let tx = TransactionBuilder::new(Address::parse(SOURCE).unwrap(), coin(100_701_000))
            .add_output(Address::parse(DESTINATION).unwrap(), coin(100_000_000))
            .network_byte(Some(0xAA))
            .build();
        let preimage = serialize_transaction_effects(&tx, 0).unwrap();
        assert_eq!(hex::encode_upper(&preimage), format!("AA{}", PREIMAGE));
        assert_eq!(
            transaction_id(&tx, 0).unwrap().to_hex(),
            "BAB8A48C4D0D696180168556CB4384A4D161C0A5882768882EE05E76D50D695A"
        );
    }

    #[test]
    fn test_sign_transaction_fills_fields() {
        let pair = key_pair();
        assert_eq!(pair.address().as_str(), SOURCE);

        let signed = sign_transaction(sample_tx(), &pair, 0, None).unwrap();
        let tx = &signed.transaction;
        assert_eq!(tx.transaction_fee, Some(coin(701_000)));
        assert_eq!(tx.tx_type, Some(AddressType::Standard));
        assert_eq!(tx.data, Some(Vec::new()));
        assert_eq!(
            tx.tx_id.unwrap().to_hex(),
            "73087AD644B817F638EA3423A9106CCC1398C67EF94D247B8A8B34E4A16F592A"
        );
        assert!(signed.verify().unwrap());
    }

    #[test]
    fn test_reference_signed_transaction() {
        let pair = key_pair();
        let source = Address::parse(SOURCE).unwrap();
        let tx = TransactionBuilder::new(source.clone(), Coin::MAX)
            .add_output(source, coin(100))
            .build();

        let signed = sign_transaction(tx, &pair, 0, None).unwrap();
        assert_eq!(
            signed.transaction.tx_id.unwrap().to_hex(),
            "F3DCD558834944ACFA14670B2DFFAB631C801A6EE15902CDF354A290F6E8BE56"
        );
        assert_eq!(
            hex::encode(signed.signature.compact()),
            concat!(
                "9c3d7cdb6bd7939f7acabd7e3b6eb00900f5cb496d6bd99354fe3f073b7b89d3",
                "268c65be85c2b677459ccd5ababd7f764eb227b3e051dbe14a7f63b97a4865eb"
            )
        );
        assert!(signed.verify().unwrap());
    }

    #[test]
    fn test_reserved_network_byte_cannot_be_signed() {
        let tx = TransactionBuilder::new(Address::parse(SOURCE).unwrap(), coin(100_701_000))
            .add_output(Address::parse(DESTINATION).unwrap(), coin(100_000_000))
            .network_byte(Some(0x01))
            .build();
        assert_eq!(
            sign_transaction(tx, &key_pair(), 0, None).unwrap_err(),
            TransactionError::Codec(CodecError::ReservedNetworkByte(0x01))
        );
    }

    #[test]
    fn test_signing_is_idempotent() {
        let pair = key_pair();
        let first = sign_transaction(sample_tx(), &pair, 3, None).unwrap();
        let second = sign_transaction(first.transaction.clone(), &pair, 3, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_insufficient_funds() {
        let tx = TransactionBuilder::new(Address::parse(SOURCE).unwrap(), coin(10))
            .add_output(Address::parse(DESTINATION).unwrap(), coin(11))
            .build();
        assert_eq!(
            sign_transaction(tx, &key_pair(), 0, None).unwrap_err(),
            TransactionError::InsufficientFunds {
                available: coin(10),
                required: coin(11)
            }
        );
    }

    #[test]
    fn test_output_overflow_is_insufficient_funds() {
        let tx = TransactionBuilder::new(Address::parse(SOURCE).unwrap(), coin(10))
            .add_output(Address::parse(DESTINATION).unwrap(), coin(i64::MAX))
            .add_output(Address::parse(DESTINATION).unwrap(), coin(1))
            .build();
        assert_eq!(tx.total_output(), Coin::MAX);
        assert_eq!(
            sign_transaction(tx, &key_pair(), 0, None).unwrap_err(),
            TransactionError::InsufficientFunds {
                available: coin(10),
                required: Coin::MAX
            }
        );

        // an i64::MAX source cannot cover outputs that sum past it either
        let tx = TransactionBuilder::new(Address::parse(SOURCE).unwrap(), Coin::MAX)
            .add_output(Address::parse(DESTINATION).unwrap(), coin(i64::MAX))
            .add_output(Address::parse(DESTINATION).unwrap(), coin(1))
            .build();
        assert!(matches!(
            tx.calculate_fee(),
            Err(TransactionError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_source_and_index() {
        let mut tx = sample_tx();
        tx.source_address = Address::Standard("V5ZguGxnAckADJMkFFG6Vpr9EGyk6w".to_string());
        assert!(matches!(
            sign_transaction(tx, &key_pair(), 0, None),
            Err(TransactionError::UnsupportedAddressType(_))
        ));
        assert_eq!(
            sign_transaction(sample_tx(), &key_pair(), -1, None).unwrap_err(),
            TransactionError::NegativeSignatureIndex(-1)
        );
    }

    #[test]
    fn test_multisig_source_uses_type_three() {
        let source = Address::parse("V23BXYqpNx3iKSEGGGMEyUNa7CoUM0").unwrap();
        let tx = TransactionBuilder::new(source, coin(5))
            .add_output(Address::parse(DESTINATION).unwrap(), coin(5))
            .build();
        let signed = sign_transaction(tx, &key_pair(), 1, Some(0xAA)).unwrap();

        let preimage = serialize_transaction_effects(&signed.transaction, 1).unwrap();
        assert_eq!(&preimage[..3], &[0xAA, 0x03, 0x03]);
        assert_eq!(signed.transaction.transaction_fee, Some(Coin::ZERO));
        assert!(signed.verify().unwrap());
    }

    #[test]
    fn test_tampered_transaction_fails_verification() {
        let mut signed = sign_transaction(sample_tx(), &key_pair(), 0, None).unwrap();
        signed.signature_index = 1;
        assert!(!signed.verify().unwrap());

        let mut signed = sign_transaction(sample_tx(), &key_pair(), 0, None).unwrap();
        signed.public_key = *KeyPair::generate(Some(&[1u8; 32])).unwrap().public_key();
        assert!(!signed.verify().unwrap());
    }

    #[test]
    fn test_too_many_outputs() {
        let destination = Address::parse(DESTINATION).unwrap();
        let mut builder = TransactionBuilder::new(Address::parse(SOURCE).unwrap(), coin(1000));
        for _ in 0..256 {
            builder = builder.add_output(destination.clone(), coin(1));
        }
        assert_eq!(
            serialize_transaction_effects(&builder.build(), 0).unwrap_err(),
            TransactionError::TooManyOutputs(256)
        );
    }
}
