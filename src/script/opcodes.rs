//! Script opcodes
//!
//! Bytes below `PUSHDATA1` push that many bytes. The rest of the byte range
//! is unassigned except for the publication opcodes below.

use serde::Serialize;

/// Opcodes understood by the publication interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum Opcode {
    // Push data (0x4c - 0x4e)
    /// Push: next byte is the length
    PushData1 = 0x4c,
    /// Push: next two bytes (little-endian) are the length
    PushData2 = 0x4d,
    /// Push: next four bytes (little-endian) are the length
    PushData4 = 0x4e,

    // Publications (0xba - 0xbe)
    /// Pop an ATV
    CheckAtv = 0xba,
    /// Pop a VTB
    CheckVtb = 0xbb,
    /// End of publications; the stack must be empty
    CheckPop = 0xbc,
    /// Pop a raw 80-byte Bitcoin header
    PopBtcHeader = 0xbd,
    /// Pop a raw 64-byte VeriBlock header
    PopVbkHeader = 0xbe,
}

impl Opcode {
    /// Convert byte to opcode. Direct pushes (below 0x4c) are not opcodes.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x4c => Some(Opcode::PushData1),
            0x4d => Some(Opcode::PushData2),
            0x4e => Some(Opcode::PushData4),
            0xba => Some(Opcode::CheckAtv),
            0xbb => Some(Opcode::CheckVtb),
            0xbc => Some(Opcode::CheckPop),
            0xbd => Some(Opcode::PopBtcHeader),
            0xbe => Some(Opcode::PopVbkHeader),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Whether the byte pushes `byte` bytes directly
    pub fn is_direct_push(byte: u8) -> bool {
        byte < Opcode::PushData1 as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Opcode::PushData1 => "OP_PUSHDATA1",
            Opcode::PushData2 => "OP_PUSHDATA2",
            Opcode::PushData4 => "OP_PUSHDATA4",
            Opcode::CheckAtv => "OP_CHECKATV",
            Opcode::CheckVtb => "OP_CHECKVTB",
            Opcode::CheckPop => "OP_CHECKPOP",
            Opcode::PopBtcHeader => "OP_POPBTCHEADER",
            Opcode::PopVbkHeader => "OP_POPVBKHEADER",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
