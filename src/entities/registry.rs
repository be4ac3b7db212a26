//! Decoding any entity by name
//!
//! `EntityKind` names every wire record; `Entity` holds one decoded value.

use clap::ValueEnum;
use serde::Serialize;

use super::btc::{BtcBlock, BtcTx, MerklePath};
use super::hash::Sha256Hash;
use super::pop::{Atv, Vtb};
use super::publication::PublicationData;
use super::vbk_block::VbkBlock;
use super::vbk_merkle::VbkMerklePath;
use super::vbk_tx::{VbkPopTx, VbkTx};
use crate::codec::{read_nested, CodecError, Decode};
use crate::core::{Address, Coin, Output};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    Address,
    Coin,
    Output,
    BtcBlock,
    BtcTx,
    MerklePath,
    VbkBlock,
    VbkMerklePath,
    PublicationData,
    VbkTx,
    VbkPopTx,
    Atv,
    Vtb,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Entity {
    Address(Address),
    Coin(Coin),
    Output(Output),
    BtcBlock(BtcBlock),
    BtcTx(BtcTx),
    MerklePath(MerklePath),
    VbkBlock(VbkBlock),
    VbkMerklePath(VbkMerklePath),
    PublicationData(PublicationData),
    VbkTx(VbkTx),
    VbkPopTx(Box<VbkPopTx>),
    Atv(Box<Atv>),
    Vtb(Box<Vtb>),
}

/// How a buffer should be read
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Block headers without their one-byte length prefix
    pub raw: bool,
    /// Subject of a Bitcoin merkle path, which the wire form omits
    pub subject: Option<Sha256Hash>,
}

impl Entity {
    /// Decode `bytes` as exactly one `kind`
    pub fn decode(kind: EntityKind, bytes: &[u8], options: DecodeOptions) -> Result<Self, CodecError> {
        log::debug!("Decoding {} bytes as {:?}", bytes.len(), kind);

        let entity = match kind {
            EntityKind::Address => Entity::Address(Address::from_bytes(bytes)?),
            EntityKind::Coin => Entity::Coin(Coin::from_bytes(bytes)?),
            EntityKind::Output => Entity::Output(Output::from_bytes(bytes)?),
            EntityKind::BtcBlock if options.raw => Entity::BtcBlock(BtcBlock::from_raw(bytes)?),
            EntityKind::BtcBlock => Entity::BtcBlock(BtcBlock::from_bytes(bytes)?),
            EntityKind::BtcTx => Entity::BtcTx(BtcTx::from_bytes(bytes)?),
            EntityKind::MerklePath => {
                let subject = options.subject.unwrap_or_default();
                let path = if options.raw {
                    read_nested(bytes, |s| MerklePath::extract(s, subject))?
                } else {
                    read_nested(bytes, |s| MerklePath::read(s, subject))?
                };
                Entity::MerklePath(path)
            }
            EntityKind::VbkBlock if options.raw => Entity::VbkBlock(VbkBlock::from_raw(bytes)?),
            EntityKind::VbkBlock => Entity::VbkBlock(VbkBlock::from_bytes(bytes)?),
            EntityKind::VbkMerklePath => Entity::VbkMerklePath(VbkMerklePath::from_bytes(bytes)?),
            EntityKind::PublicationData => {
                Entity::PublicationData(PublicationData::from_bytes(bytes)?)
            }
            EntityKind::VbkTx => Entity::VbkTx(VbkTx::from_bytes(bytes)?),
            EntityKind::VbkPopTx => Entity::VbkPopTx(Box::new(VbkPopTx::from_bytes(bytes)?)),
            EntityKind::Atv => Entity::Atv(Box::new(Atv::from_bytes(bytes)?)),
            EntityKind::Vtb => Entity::Vtb(Box::new(Vtb::from_bytes(bytes)?)),
        };
        Ok(entity)
    }

    pub fn from_hex(kind: EntityKind, hex_str: &str, options: DecodeOptions) -> Result<Self, CodecError> {
        Self::decode(kind, &hex::decode(hex_str.trim())?, options)
    }

    /// Transaction id, for the kinds that have one
    pub fn id(&self) -> Result<Option<Sha256Hash>, CodecError> {
        let id = match self {
            Entity::BtcTx(tx) => Some(tx.id()),
            Entity::BtcBlock(block) => Some(block.hash()?.reversed()),
            Entity::VbkTx(tx) => Some(tx.id()?),
            Entity::VbkPopTx(tx) => Some(tx.id()?),
            Entity::Atv(atv) => Some(atv.transaction.id()?),
            Entity::Vtb(vtb) => Some(vtb.transaction.id()?),
            _ => None,
        };
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::pop::tests::atv_hex;
    use crate::entities::vbk_block::tests::VBK_BLOCK;

    #[test]
    fn test_decode_by_kind() {
        let entity = Entity::from_hex(EntityKind::Atv, &atv_hex(), DecodeOptions::default()).unwrap();
        assert!(matches!(entity, Entity::Atv(_)));
        assert_eq!(
            entity.id().unwrap().unwrap().to_hex(),
            "1FEC8AA4983D69395010E4D18CD8B943749D5B4F575E88A375DEBDC5ED22531C"
        );
    }

    #[test]
    fn test_raw_headers() {
        let options = DecodeOptions {
            raw: true,
            ..Default::default()
        };
        let entity = Entity::from_hex(EntityKind::VbkBlock, &VBK_BLOCK[2..], options).unwrap();
        let prefixed = Entity::from_hex(EntityKind::VbkBlock, VBK_BLOCK, DecodeOptions::default()).unwrap();
        assert_eq!(entity, prefixed);
    }

    #[test]
    fn test_kind_mismatch_fails() {
        assert!(Entity::from_hex(EntityKind::VbkTx, VBK_BLOCK, DecodeOptions::default()).is_err());
    }

    #[test]
    fn test_serialized_with_kind_tag() {
        let entity = Entity::from_hex(EntityKind::Coin, "0203E8", DecodeOptions::default()).unwrap();
        assert_eq!(
            serde_json::to_string(&entity).unwrap(),
            r#"{"kind":"coin","value":"1000"}"#
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(
            EntityKind::from_str("vbk-pop-tx", true).unwrap(),
            EntityKind::VbkPopTx
        );
    }
}
