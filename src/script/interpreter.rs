//! Publication interpreter
//!
//! A straight-line stack machine over a Bitcoin script sig:
//! - Push opcodes place raw byte spans on the stack
//! - `OP_CHECKATV` / `OP_CHECKVTB` pop and decode a publication
//! - `OP_POPBTCHEADER` / `OP_POPVBKHEADER` pop a raw context header
//! - `OP_CHECKPOP` ends the script with an empty stack
//!
//! There are no jumps or loops. Decoders are supplied by the caller through
//! `InterpreterConfig`.

use serde::Serialize;
use thiserror::Error;

use crate::codec::{CodecError, Decode, ReadStream};
use crate::entities::constants::{BTC_HEADER_SIZE, VBK_HEADER_SIZE};
use crate::entities::hash::as_hex_list;
use crate::entities::{Atv, Vtb};
use crate::error::ErrorCategory;
use crate::script::opcodes::Opcode;

// =============================================================================
// Interpreter Constants
// =============================================================================

/// Default stack depth ceiling
pub const MAX_STACK_SIZE: usize = 1024;

// =============================================================================
// Script Errors
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("Empty script")]
    EmptyScript,
    #[error("Stack underflow at {0}")]
    StackUnderflow(Opcode),
    #[error("Stack overflow (max: {0})")]
    StackOverflow(usize),
    #[error("Unknown opcode: {0:#04x}")]
    UnknownOpcode(u8),
    #[error("{opcode} expects a header of {expected} bytes, got {actual}")]
    InvalidHeaderSize {
        opcode: Opcode,
        expected: usize,
        actual: usize,
    },
    #[error("Found a second ATV")]
    DuplicateAtv,
    #[error("End of script without an ATV")]
    MissingAtv,
    #[error("Unexpected opcode after OP_CHECKPOP ({0} bytes left)")]
    UnexpectedTrailingOpcode(usize),
    #[error("OP_CHECKPOP with {0} unconsumed stack items")]
    NonEmptyStackAtPop(usize),
    #[error("Invalid publication at {opcode}: {source}")]
    InvalidPublication {
        opcode: Opcode,
        #[source]
        source: CodecError,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ScriptError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScriptError::EmptyScript
            | ScriptError::UnknownOpcode(_)
            | ScriptError::InvalidHeaderSize { .. } => ErrorCategory::Format,
            ScriptError::StackUnderflow(_)
            | ScriptError::StackOverflow(_)
            | ScriptError::DuplicateAtv
            | ScriptError::MissingAtv
            | ScriptError::UnexpectedTrailingOpcode(_)
            | ScriptError::NonEmptyStackAtPop(_) => ErrorCategory::Semantic,
            ScriptError::InvalidPublication { source, .. } => source.category(),
            ScriptError::Codec(e) => e.category(),
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

pub type AtvDecoder = fn(&[u8]) -> Result<Atv, CodecError>;
pub type VtbDecoder = fn(&[u8]) -> Result<Vtb, CodecError>;

/// Decoders used for pushed publications
#[derive(Clone, Copy)]
pub struct PublicationDecoders {
    pub atv: AtvDecoder,
    pub vtb: VtbDecoder,
}

impl std::fmt::Debug for PublicationDecoders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicationDecoders").finish_non_exhaustive()
    }
}

impl Default for PublicationDecoders {
    fn default() -> Self {
        Self {
            atv: Atv::from_bytes,
            vtb: Vtb::from_bytes,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InterpreterConfig {
    pub max_stack_size: usize,
    pub decoders: PublicationDecoders,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_stack_size: MAX_STACK_SIZE,
            decoders: PublicationDecoders::default(),
        }
    }
}

// =============================================================================
// Publications
// =============================================================================

/// Raw context headers popped by the script
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublicationContext {
    #[serde(serialize_with = "as_hex_list")]
    pub btc: Vec<Vec<u8>>,
    #[serde(serialize_with = "as_hex_list")]
    pub vbk: Vec<Vec<u8>>,
}

/// Everything a script sig publishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Publications {
    pub atv: Atv,
    pub atv_hex: String,
    pub vtbs: Vec<Vtb>,
    pub vtbs_hex: Vec<String>,
    pub context: PublicationContext,
}

// =============================================================================
// Interpreter
// =============================================================================

struct Interpreter<'s, 'c> {
    script: ReadStream<'s>,
    stack: Vec<&'s [u8]>,
    config: &'c InterpreterConfig,
    atv: Option<(Atv, String)>,
    vtbs: Vec<Vtb>,
    vtbs_hex: Vec<String>,
    context: PublicationContext,
}

impl<'s, 'c> Interpreter<'s, 'c> {
    fn new(script: &'s [u8], config: &'c InterpreterConfig) -> Self {
        Self {
            script: ReadStream::new(script),
            stack: Vec::new(),
            config,
            atv: None,
            vtbs: Vec::new(),
            vtbs_hex: Vec::new(),
            context: PublicationContext::default(),
        }
    }

    fn run(mut self) -> Result<Publications, ScriptError> {
        while self.script.has_more(1) {
            self.step()?;
        }

        let (atv, atv_hex) = self.atv.ok_or(ScriptError::MissingAtv)?;
        Ok(Publications {
            atv,
            atv_hex,
            vtbs: self.vtbs,
            vtbs_hex: self.vtbs_hex,
            context: self.context,
        })
    }

    fn step(&mut self) -> Result<(), ScriptError> {
        let byte = self.script.read_u8()?;

        if Opcode::is_direct_push(byte) {
            let data = self.script.read(byte as usize)?;
            return self.push(data);
        }

        let opcode = Opcode::from_byte(byte).ok_or(ScriptError::UnknownOpcode(byte))?;

        match opcode {
            Opcode::PushData1 => {
                let size = self.script.read_u8()? as usize;
                let data = self.script.read(size)?;
                self.push(data)?;
            }
            Opcode::PushData2 => {
                let size = self.script.read_u16_le()? as usize;
                let data = self.script.read(size)?;
                self.push(data)?;
            }
            Opcode::PushData4 => {
                let size = self.script.read_u32_le()? as usize;
                let data = self.script.read(size)?;
                self.push(data)?;
            }
            Opcode::PopBtcHeader => {
                let header = self.pop_header(opcode, BTC_HEADER_SIZE)?;
                self.context.btc.push(header);
            }
            Opcode::PopVbkHeader => {
                let header = self.pop_header(opcode, VBK_HEADER_SIZE)?;
                self.context.vbk.push(header);
            }
            Opcode::CheckVtb => {
                let data = self.pop(opcode)?;
                let vtb = (self.config.decoders.vtb)(data)
                    .map_err(|source| ScriptError::InvalidPublication { opcode, source })?;
                log::debug!("Script publishes a {} byte VTB", data.len());
                self.vtbs.push(vtb);
                self.vtbs_hex.push(hex::encode_upper(data));
            }
            Opcode::CheckAtv => {
                let data = self.pop(opcode)?;
                if self.atv.is_some() {
                    return Err(ScriptError::DuplicateAtv);
                }
                let atv = (self.config.decoders.atv)(data)
                    .map_err(|source| ScriptError::InvalidPublication { opcode, source })?;
                log::debug!("Script publishes a {} byte ATV", data.len());
                self.atv = Some((atv, hex::encode_upper(data)));
            }
            Opcode::CheckPop => {
                if self.script.has_more(1) {
                    return Err(ScriptError::UnexpectedTrailingOpcode(self.script.remaining()));
                }
                if !self.stack.is_empty() {
                    return Err(ScriptError::NonEmptyStackAtPop(self.stack.len()));
                }
            }
        }

        Ok(())
    }

    fn push(&mut self, data: &'s [u8]) -> Result<(), ScriptError> {
        if self.stack.len() >= self.config.max_stack_size {
            return Err(ScriptError::StackOverflow(self.config.max_stack_size));
        }
        self.stack.push(data);
        Ok(())
    }

    fn pop(&mut self, opcode: Opcode) -> Result<&'s [u8], ScriptError> {
        self.stack.pop().ok_or(ScriptError::StackUnderflow(opcode))
    }

    fn pop_header(&mut self, opcode: Opcode, expected: usize) -> Result<Vec<u8>, ScriptError> {
        let header = self.pop(opcode)?;
        if header.len() != expected {
            return Err(ScriptError::InvalidHeaderSize {
                opcode,
                expected,
                actual: header.len(),
            });
        }
        Ok(header.to_vec())
    }
}

/// Run a script sig and collect its publications
pub fn interpret(script: &[u8], config: &InterpreterConfig) -> Result<Publications, ScriptError> {
    if script.is_empty() {
        return Err(ScriptError::EmptyScript);
    }
    log::debug!("Interpreting {} byte script", script.len());
    Interpreter::new(script, config).run()
}

/// Interpret a hex script sig with the default decoders
pub fn parse_btc_script_sig(hex_str: &str) -> Result<Publications, ScriptError> {
    let script = hex::decode(hex_str.trim()).map_err(CodecError::from)?;
    interpret(&script, &InterpreterConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Encode;
    use crate::entities::pop::tests::{atv_hex, sample_vtb};
    use crate::entities::vbk_block::tests::VBK_BLOCK;

    fn push(script: &mut Vec<u8>, data: &[u8]) {
        match data.len() {
            n if n < 0x4c => script.push(n as u8),
            n if n <= 0xff => script.extend([0x4c, n as u8]),
            n if n <= 0xffff => {
                script.push(0x4d);
                script.extend((n as u16).to_le_bytes());
            }
            n => {
                script.push(0x4e);
                script.extend((n as u32).to_le_bytes());
            }
        }
        script.extend_from_slice(data);
    }

    fn atv_bytes() -> Vec<u8> {
        hex::decode(atv_hex()).unwrap()
    }

    fn full_script() -> Vec<u8> {
        let mut script = Vec::new();
        push(&mut script, &atv_bytes());
        script.push(Opcode::CheckAtv.to_byte());
        push(&mut script, &sample_vtb().to_bytes().unwrap());
        script.push(Opcode::CheckVtb.to_byte());
        push(&mut script, &hex::decode(&VBK_BLOCK[2..]).unwrap());
        script.push(Opcode::PopVbkHeader.to_byte());
        push(&mut script, &[0u8; 80]);
        script.push(Opcode::PopBtcHeader.to_byte());
        script.push(Opcode::CheckPop.to_byte());
        script
    }

    #[test]
    fn test_full_script() {
        let publications = interpret(&full_script(), &InterpreterConfig::default()).unwrap();

        assert_eq!(publications.atv_hex, atv_hex());
        assert_eq!(publications.atv.containing_block.height, 5000);
        assert_eq!(publications.vtbs, vec![sample_vtb()]);
        assert_eq!(publications.vtbs_hex.len(), 1);
        assert_eq!(publications.context.btc, vec![vec![0u8; 80]]);
        assert_eq!(publications.context.vbk.len(), 1);
    }

    #[test]
    fn test_parse_hex_script() {
        let hex_script = hex::encode(full_script());
        let publications = parse_btc_script_sig(&hex_script).unwrap();
        assert_eq!(publications.vtbs.len(), 1);
    }

    #[test]
    fn test_atv_only() {
        let mut script = Vec::new();
        push(&mut script, &atv_bytes());
        script.push(Opcode::CheckAtv.to_byte());

        let publications = interpret(&script, &InterpreterConfig::default()).unwrap();
        assert!(publications.vtbs.is_empty());
        assert!(publications.context.btc.is_empty());
    }

    #[test]
    fn test_missing_atv() {
        let mut script = Vec::new();
        push(&mut script, &sample_vtb().to_bytes().unwrap());
        script.push(Opcode::CheckVtb.to_byte());
        script.push(Opcode::CheckPop.to_byte());

        assert_eq!(
            interpret(&script, &InterpreterConfig::default()).unwrap_err(),
            ScriptError::MissingAtv
        );
    }

    #[test]
    fn test_duplicate_atv() {
        let mut script = Vec::new();
        for _ in 0..2 {
            push(&mut script, &atv_bytes());
            script.push(Opcode::CheckAtv.to_byte());
        }

        let err = interpret(&script, &InterpreterConfig::default()).unwrap_err();
        assert_eq!(err, ScriptError::DuplicateAtv);
        assert_eq!(err.category(), ErrorCategory::Semantic);
    }

    #[test]
    fn test_non_empty_stack_at_pop() {
        let mut script = Vec::new();
        push(&mut script, &atv_bytes());
        script.push(Opcode::CheckAtv.to_byte());
        push(&mut script, &[1, 2, 3]);
        script.push(Opcode::CheckPop.to_byte());

        assert_eq!(
            interpret(&script, &InterpreterConfig::default()).unwrap_err(),
            ScriptError::NonEmptyStackAtPop(1)
        );
    }

    #[test]
    fn test_trailing_opcode_after_pop() {
        let mut script = full_script();
        script.push(0x00);

        assert_eq!(
            interpret(&script, &InterpreterConfig::default()).unwrap_err(),
            ScriptError::UnexpectedTrailingOpcode(1)
        );
    }

    #[test]
    fn test_stack_underflow() {
        let script = [Opcode::CheckAtv.to_byte()];
        assert_eq!(
            interpret(&script, &InterpreterConfig::default()).unwrap_err(),
            ScriptError::StackUnderflow(Opcode::CheckAtv)
        );
    }

    #[test]
    fn test_unknown_opcode() {
        let script = [0x00, 0x51];
        assert_eq!(
            interpret(&script, &InterpreterConfig::default()).unwrap_err(),
            ScriptError::UnknownOpcode(0x51)
        );
    }

    #[test]
    fn test_empty_script() {
        assert_eq!(
            interpret(&[], &InterpreterConfig::default()).unwrap_err(),
            ScriptError::EmptyScript
        );
    }

    #[test]
    fn test_header_size_checked() {
        let mut script = Vec::new();
        push(&mut script, &[0u8; 79]);
        script.push(Opcode::PopBtcHeader.to_byte());

        assert_eq!(
            interpret(&script, &InterpreterConfig::default()).unwrap_err(),
            ScriptError::InvalidHeaderSize {
                opcode: Opcode::PopBtcHeader,
                expected: 80,
                actual: 79
            }
        );
    }

    #[test]
    fn test_truncated_push() {
        let script = [0x4d, 0x10, 0x00, 0x01];
        let err = interpret(&script, &InterpreterConfig::default()).unwrap_err();
        assert!(matches!(err, ScriptError::Codec(CodecError::OutOfData { .. })));
        assert_eq!(err.category(), ErrorCategory::Bounds);
    }

    #[test]
    fn test_stack_depth_ceiling() {
        let config = InterpreterConfig {
            max_stack_size: 2,
            ..Default::default()
        };
        let script = [0x00, 0x00, 0x00];
        assert_eq!(
            interpret(&script, &config).unwrap_err(),
            ScriptError::StackOverflow(2)
        );
    }

    #[test]
    fn test_bad_publication() {
        let mut script = Vec::new();
        push(&mut script, &[0xde, 0xad]);
        script.push(Opcode::CheckAtv.to_byte());

        let err = interpret(&script, &InterpreterConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::InvalidPublication {
                opcode: Opcode::CheckAtv,
                ..
            }
        ));
    }

    #[test]
    fn test_custom_decoders() {
        fn reject(_: &[u8]) -> Result<Atv, CodecError> {
            Err(CodecError::TrailingBytes(0))
        }

        let config = InterpreterConfig {
            decoders: PublicationDecoders {
                atv: reject,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut script = Vec::new();
        push(&mut script, &atv_bytes());
        script.push(Opcode::CheckAtv.to_byte());

        assert!(interpret(&script, &config).is_err());
    }
}
