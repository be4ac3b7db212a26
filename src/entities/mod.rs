//! Wire entities
//!
//! Each record reads itself from a `ReadStream` and writes its canonical
//! form through `Encode`. Nested records are exclusively owned by their
//! parent; a failed read never yields a partial entity.

pub mod btc;
pub mod constants;
pub mod hash;
pub mod pop;
pub mod publication;
pub mod registry;
pub mod vbk_block;
pub mod vbk_merkle;
pub mod vbk_tx;

pub use btc::{BtcBlock, BtcTx, MerklePath};
pub use hash::{Sha256Hash, VBlakeHash};
pub use pop::{Atv, ProofRecord, Vtb};
pub use publication::PublicationData;
pub use registry::{DecodeOptions, Entity, EntityKind};
pub use vbk_block::VbkBlock;
pub use vbk_merkle::VbkMerklePath;
pub use vbk_tx::{TxType, VbkPopTx, VbkTx};
