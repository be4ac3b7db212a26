//! ATV and VTB: a VeriBlock transaction with the proof of its inclusion
//!
//! - ATV (alt publication): a `VbkTx` carrying altchain publication data
//! - VTB (VeriBlock-to-Bitcoin): a `VbkPopTx` publishing a VeriBlock block
//!   into Bitcoin
//!
//! Both are followed by a merkle path into the containing VeriBlock block,
//! that block, and a list of context blocks.

use serde::Serialize;

use super::constants::MAX_CONTEXT_COUNT_ALT_PUBLICATION;
use super::vbk_block::VbkBlock;
use super::vbk_merkle::VbkMerklePath;
use super::vbk_tx::{VbkPopTx, VbkTx};
use crate::codec::{read_array_of, write_single_be_value, ByteSink, CodecError, Decode, Encode, ReadStream};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRecord<T> {
    pub transaction: T,
    pub merkle_path: VbkMerklePath,
    pub containing_block: VbkBlock,
    pub context: Vec<VbkBlock>,
}

pub type Atv = ProofRecord<VbkTx>;
pub type Vtb = ProofRecord<VbkPopTx>;

impl<T: Encode> Encode for ProofRecord<T> {
    fn encode<S: ByteSink>(&self, out: &mut S) -> Result<(), CodecError> {
        self.transaction.encode(out)?;
        self.merkle_path.encode(out)?;
        self.containing_block.encode(out)?;

        write_single_be_value(out, self.context.len() as i64)?;
        for block in &self.context {
            block.encode(out)?;
        }
        Ok(())
    }
}

impl<T: Decode> Decode for ProofRecord<T> {
    fn decode(stream: &mut ReadStream<'_>) -> Result<Self, CodecError> {
        let transaction = T::decode(stream)?;
        let merkle_path = VbkMerklePath::decode(stream)?;
        let containing_block = VbkBlock::read(stream)?;
        let context = read_array_of(stream, MAX_CONTEXT_COUNT_ALT_PUBLICATION, VbkBlock::read)?;

        Ok(Self {
            transaction,
            merkle_path,
            containing_block,
            context,
        })
    }
}
