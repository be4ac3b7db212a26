//! Publication extraction from Bitcoin script sigs
//!
//! This module contains:
//! - Opcodes
//! - The interpreter that collects ATV, VTBs and context headers

pub mod interpreter;
pub mod opcodes;

pub use interpreter::{
    interpret, parse_btc_script_sig, AtvDecoder, InterpreterConfig, PublicationContext,
    PublicationDecoders, Publications, ScriptError, VtbDecoder, MAX_STACK_SIZE,
};
pub use opcodes::Opcode;
