//! Sizes and ceilings of the wire format
//!
//! Every count and length read from untrusted input is checked against one
//! of these before anything is allocated.

pub use crate::core::address::ADDRESS_SIZE;

pub const HASH256_SIZE: usize = 32;
pub const VBK_HASH_SIZE: usize = 24;

pub const BTC_HEADER_SIZE: usize = 80;
pub const VBK_HEADER_SIZE: usize = 64;

/// Truncated hash fragments inside a VeriBlock header
pub const PREVIOUS_BLOCK_LENGTH: usize = 12;
pub const PREVIOUS_KEYSTONE_LENGTH: usize = 9;
pub const VBK_MERKLE_ROOT_LENGTH: usize = 16;

pub const MAX_LAYER_COUNT_MERKLE: usize = 40;

/// Layers with their length bytes, plus index, layer count, bottom data size
/// and their prefixes
pub const MAX_MERKLE_BYTES: usize = (HASH256_SIZE + 1) * MAX_LAYER_COUNT_MERKLE + 5 + 5 + 5 + 5 + 4;

/// BIP 141 block weight limit
pub const MAX_RAWTX_SIZE: usize = 4_000_000;

pub const MAX_OUTPUTS_COUNT: usize = 255;
pub const MAX_SIGNATURE_SIZE: usize = 72;
pub const PUBLIC_KEY_SIZE: usize = 88;

pub const MAX_CONTEXT_COUNT: usize = 150_000;
pub const MAX_CONTEXT_COUNT_ALT_PUBLICATION: usize = 15_000;

pub const MAX_HEADER_SIZE_PUBLICATION_DATA: usize = 1024;
pub const MAX_PAYOUT_SIZE_PUBLICATION_DATA: usize = 100;
pub const MAX_CONTEXT_SIZE_PUBLICATION_DATA: usize = 100;

/// Largest single-length integer record: one length byte plus 8 value bytes
const MAX_INT64_RECORD: usize = 1 + 8;
/// Largest var-len prefix: one length-of-length byte plus 4 length bytes
const MAX_VAR_LEN_PREFIX: usize = 1 + 4;
/// `[type][len][bytes]`
const MAX_ADDRESS_RECORD: usize = 1 + 1 + ADDRESS_SIZE;

pub const MAX_SIZE_PUBLICATION_DATA: usize = MAX_INT64_RECORD
    + 3 * MAX_VAR_LEN_PREFIX
    + MAX_HEADER_SIZE_PUBLICATION_DATA
    + MAX_CONTEXT_SIZE_PUBLICATION_DATA
    + MAX_PAYOUT_SIZE_PUBLICATION_DATA;

pub const MAX_RAWTX_SIZE_VBK_TX: usize = 2 // network byte and type
    + MAX_ADDRESS_RECORD
    + MAX_INT64_RECORD
    + 1 // output count
    + MAX_OUTPUTS_COUNT * (MAX_ADDRESS_RECORD + MAX_INT64_RECORD)
    + MAX_INT64_RECORD
    + MAX_VAR_LEN_PREFIX
    + MAX_SIZE_PUBLICATION_DATA;

pub const MAX_RAWTX_SIZE_VBK_POP_TX: usize = 2
    + MAX_ADDRESS_RECORD
    + 1 + VBK_HEADER_SIZE
    + MAX_VAR_LEN_PREFIX + MAX_RAWTX_SIZE
    + MAX_VAR_LEN_PREFIX + MAX_MERKLE_BYTES
    + 1 + BTC_HEADER_SIZE
    + MAX_VAR_LEN_PREFIX
    + MAX_CONTEXT_COUNT * (1 + BTC_HEADER_SIZE);
