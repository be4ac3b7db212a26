//! VeriBlock transactions
//!
//! Both kinds share one envelope:
//! - var-len raw body (the part that is hashed into the id)
//! - signature, one-byte length, up to 72 bytes
//! - public key, one-byte length, exactly 88 bytes
//!
//! The body may start with a network byte before the type byte.

use serde::Serialize;

use super::btc::{BtcBlock, BtcTx, MerklePath};
use super::constants::{
    MAX_CONTEXT_COUNT, MAX_RAWTX_SIZE_VBK_POP_TX, MAX_RAWTX_SIZE_VBK_TX, MAX_SIGNATURE_SIZE,
    MAX_SIZE_PUBLICATION_DATA, PUBLIC_KEY_SIZE,
};
use super::hash::{as_hex, Sha256Hash};
use super::publication::PublicationData;
use super::vbk_block::VbkBlock;
use crate::codec::{
    read_array_of, read_nested, read_network_byte, read_single_byte_len_value,
    read_single_i64_be_value, read_var_len_value, write_single_be_value,
    write_single_byte_len_value, write_var_len_value, ByteSink, CodecError, Decode, Encode,
    ReadStream,
};
use crate::config::is_reserved_network_byte;
use crate::core::transaction::write_outputs;
use crate::core::{Address, Coin, Output};
use crate::crypto::{sha256, PublicKey, Sha256WithEcdsa, Signature};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum TxType {
    VbkTx = 0x01,
    VbkPopTx = 0x02,
}

impl TxType {
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Split the envelope into (raw body, signature, public key)
fn read_envelope<'a>(
    stream: &mut ReadStream<'a>,
    max_raw_size: usize,
) -> std::result::Result<(&'a [u8], &'a [u8], &'a [u8]), CodecError> {
    let raw = read_var_len_value(stream, 0, max_raw_size)?;
    let signature = read_single_byte_len_value(stream, 0, MAX_SIGNATURE_SIZE)?;
    let public_key = read_single_byte_len_value(stream, PUBLIC_KEY_SIZE, PUBLIC_KEY_SIZE)?;
    Ok((raw, signature, public_key))
}

fn write_envelope<S: ByteSink>(
    out: &mut S,
    raw: &[u8],
    signature: &[u8],
    public_key: &[u8],
) -> std::result::Result<(), CodecError> {
    write_var_len_value(out, raw)?;
    write_single_byte_len_value(out, signature)?;
    write_single_byte_len_value(out, public_key)
}

fn write_type<S: ByteSink>(
    out: &mut S,
    network_byte: Option<u8>,
    tx_type: TxType,
) -> std::result::Result<(), CodecError> {
    if let Some(network_byte) = network_byte {
        // a leading type byte means "no network byte" to the reader
        if is_reserved_network_byte(network_byte) {
            return Err(CodecError::ReservedNetworkByte(network_byte));
        }
        out.write_u8(network_byte)?;
    }
    out.write_u8(tx_type.to_byte())
}

/// SHA256withECDSA over `id`, using the embedded key and signature
fn verify_embedded(id: &Sha256Hash, signature: &[u8], public_key: &[u8]) -> Result<bool> {
    let signature = Signature::from_der(signature)?;
    let public_key = PublicKey::from_bytes(public_key)?;
    Ok(Sha256WithEcdsa::verify(id.as_bytes(), &signature, &public_key))
}

// =============================================================================
// VbkTx
// =============================================================================

/// A standard transaction, here carrying publication data for an altchain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VbkTx {
    pub network_byte: Option<u8>,
    pub source_address: Address,
    pub source_amount: Coin,
    pub outputs: Vec<Output>,
    pub signature_index: i64,
    pub publication_data: PublicationData,
    #[serde(serialize_with = "as_hex")]
    pub signature: Vec<u8>,
    #[serde(serialize_with = "as_hex")]
    pub public_key: Vec<u8>,
}

struct VbkTxBody<'a>(&'a VbkTx);

impl Encode for VbkTxBody<'_> {
    fn encode<S: ByteSink>(&self, out: &mut S) -> std::result::Result<(), CodecError> {
        let tx = self.0;
        write_type(out, tx.network_byte, TxType::VbkTx)?;
        tx.source_address.encode(out)?;
        tx.source_amount.encode(out)?;
        write_outputs(out, &tx.outputs)?;
        write_single_be_value(out, tx.signature_index)?;
        write_var_len_value(out, &tx.publication_data.to_bytes()?)
    }
}

impl VbkTx {
    fn extract_body(
        stream: &mut ReadStream<'_>,
        signature: &[u8],
        public_key: &[u8],
    ) -> std::result::Result<Self, CodecError> {
        let network_byte = read_network_byte(stream, TxType::VbkTx.to_byte())?;
        let source_address = Address::decode(stream)?;
        let source_amount = Coin::decode(stream)?;

        let output_count = stream.read_u8()?;
        let outputs = (0..output_count)
            .map(|_| Output::decode(stream))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let signature_index = read_single_i64_be_value(stream)?;
        let publication_bytes = read_var_len_value(stream, 0, MAX_SIZE_PUBLICATION_DATA)?;
        let publication_data = PublicationData::from_bytes(publication_bytes)?;

        Ok(Self {
            network_byte,
            source_address,
            source_amount,
            outputs,
            signature_index,
            publication_data,
            signature: signature.to_vec(),
            public_key: public_key.to_vec(),
        })
    }

    /// The signed body: everything but the signature and public key
    pub fn raw_body(&self) -> std::result::Result<Vec<u8>, CodecError> {
        VbkTxBody(self).to_bytes()
    }

    /// SHA-256 of the raw body
    pub fn id(&self) -> std::result::Result<Sha256Hash, CodecError> {
        Ok(Sha256Hash::new(sha256(&self.raw_body()?)))
    }

    pub fn verify_signature(&self) -> Result<bool> {
        verify_embedded(&self.id()?, &self.signature, &self.public_key)
    }
}

impl Encode for VbkTx {
    fn encode<S: ByteSink>(&self, out: &mut S) -> std::result::Result<(), CodecError> {
        write_envelope(out, &self.raw_body()?, &self.signature, &self.public_key)
    }
}

impl Decode for VbkTx {
    fn decode(stream: &mut ReadStream<'_>) -> std::result::Result<Self, CodecError> {
        let (raw, signature, public_key) = read_envelope(stream, MAX_RAWTX_SIZE_VBK_TX)?;
        let tx = read_nested(raw, |body| Self::extract_body(body, signature, public_key))?;
        log::debug!("Read VbkTx from {} with {} outputs", tx.source_address, tx.outputs.len());
        Ok(tx)
    }
}

// =============================================================================
// VbkPopTx
// =============================================================================

/// Proof-of-proof transaction: a VeriBlock block published inside Bitcoin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VbkPopTx {
    pub network_byte: Option<u8>,
    pub address: Address,
    pub published_block: VbkBlock,
    pub bitcoin_transaction: BtcTx,
    pub merkle_path: MerklePath,
    pub block_of_proof: BtcBlock,
    pub block_of_proof_context: Vec<BtcBlock>,
    #[serde(serialize_with = "as_hex")]
    pub signature: Vec<u8>,
    #[serde(serialize_with = "as_hex")]
    pub public_key: Vec<u8>,
}

struct VbkPopTxBody<'a>(&'a VbkPopTx);

impl Encode for VbkPopTxBody<'_> {
    fn encode<S: ByteSink>(&self, out: &mut S) -> std::result::Result<(), CodecError> {
        let tx = self.0;
        write_type(out, tx.network_byte, TxType::VbkPopTx)?;
        tx.address.encode(out)?;
        tx.published_block.encode(out)?;
        tx.bitcoin_transaction.encode(out)?;
        tx.merkle_path.encode(out)?;
        tx.block_of_proof.encode(out)?;

        write_single_be_value(out, tx.block_of_proof_context.len() as i64)?;
        for block in &tx.block_of_proof_context {
            block.encode(out)?;
        }
        Ok(())
    }
}

impl VbkPopTx {
    fn extract_body(
        stream: &mut ReadStream<'_>,
        signature: &[u8],
        public_key: &[u8],
    ) -> std::result::Result<Self, CodecError> {
        let network_byte = read_network_byte(stream, TxType::VbkPopTx.to_byte())?;
        let address = Address::decode(stream)?;
        let published_block = VbkBlock::read(stream)?;
        let bitcoin_transaction = BtcTx::decode(stream)?;
        // the path proves the Bitcoin transaction, so its id is the subject
        let merkle_path = MerklePath::read(stream, bitcoin_transaction.id())?;
        let block_of_proof = BtcBlock::read(stream)?;
        let block_of_proof_context = read_array_of(stream, MAX_CONTEXT_COUNT, BtcBlock::read)?;

        Ok(Self {
            network_byte,
            address,
            published_block,
            bitcoin_transaction,
            merkle_path,
            block_of_proof,
            block_of_proof_context,
            signature: signature.to_vec(),
            public_key: public_key.to_vec(),
        })
    }

    pub fn raw_body(&self) -> std::result::Result<Vec<u8>, CodecError> {
        VbkPopTxBody(self).to_bytes()
    }

    pub fn id(&self) -> std::result::Result<Sha256Hash, CodecError> {
        Ok(Sha256Hash::new(sha256(&self.raw_body()?)))
    }

    pub fn verify_signature(&self) -> Result<bool> {
        verify_embedded(&self.id()?, &self.signature, &self.public_key)
    }
}

impl Encode for VbkPopTx {
    fn encode<S: ByteSink>(&self, out: &mut S) -> std::result::Result<(), CodecError> {
        write_envelope(out, &self.raw_body()?, &self.signature, &self.public_key)
    }
}

impl Decode for VbkPopTx {
    fn decode(stream: &mut ReadStream<'_>) -> std::result::Result<Self, CodecError> {
        let (raw, signature, public_key) = read_envelope(stream, MAX_RAWTX_SIZE_VBK_POP_TX)?;
        let tx = read_nested(raw, |body| Self::extract_body(body, signature, public_key))?;
        log::debug!(
            "Read VbkPopTx from {} with {} context blocks",
            tx.address,
            tx.block_of_proof_context.len()
        );
        Ok(tx)
    }
}
