//! OpCode definitions for the Gamequeer VM
//!
//! Instructions are fixed-width 10-byte records:
//!
//! `[8-bit opcode][8-bit flags][32-bit arg1][32-bit arg2]`
//!
//! Both arguments are little-endian. Unless a flag says otherwise they are
//! game pointers; arg1 names the destination of every value-producing
//! instruction.

use std::fmt;

/// Virtual machine instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    // ===== Control =====
    /// No operation
    Nop = 0x00,
    /// End of script
    Done = 0x01,
    /// Load stage `arg1` and end the script
    GoStage = 0x02,
    /// Start animation `arg1` in slot `op2`
    Play = 0x03,
    /// Start LED cue `arg1`
    Cue = 0x04,
    /// Assign `op2` to `arg1`, typed by flags
    SetVar = 0x05,
    /// Continue at `arg1`
    Goto = 0x06,

    // ===== Arithmetic =====
    /// `*arg1 += op2`
    AddBy = 0x07,
    /// `*arg1 -= op2`
    SubBy = 0x08,
    /// `*arg1 *= op2`
    MulBy = 0x09,
    /// `*arg1 /= op2` (0 when `op2` is 0)
    DivBy = 0x0A,
    /// `*arg1 %= op2` (0 when `op2` is 0)
    ModBy = 0x0B,

    // ===== Comparison =====
    Eq = 0x0C,
    Ne = 0x0D,
    Gt = 0x0E,
    Lt = 0x0F,
    Ge = 0x10,
    Le = 0x11,

    // ===== Logical =====
    And = 0x12,
    Or = 0x13,
    /// `*arg1 = !op2`
    Not = 0x14,
    /// `*arg1 = -op2`
    Neg = 0x15,

    /// Continue at `arg1` when `op2` is zero
    GotoIfN = 0x16,
    /// Arm (op2 > 0) or disarm the one-shot timer
    Timer = 0x17,

    // ===== Bitwise =====
    BwAnd = 0x18,
    BwOr = 0x19,
    BwXor = 0x1A,
    /// `*arg1 = ~op2`
    BwNot = 0x1B,
    BwShl = 0x1C,
    BwShr = 0x1D,

    // ===== Badge bits =====
    /// `*arg1 = badge bit op2`
    QcGet = 0x1E,
    /// Set badge bit `op2`
    QcSet = 0x1F,
    /// Clear badge bit `op2`
    QcClr = 0x20,

    // ===== Strings =====
    /// `*arg1 = *arg1 ++ *arg2`, truncated
    StrCat = 0x21,
}

impl OpCode {
    /// Get opcode from byte value
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(OpCode::Nop),
            0x01 => Some(OpCode::Done),
            0x02 => Some(OpCode::GoStage),
            0x03 => Some(OpCode::Play),
            0x04 => Some(OpCode::Cue),
            0x05 => Some(OpCode::SetVar),
            0x06 => Some(OpCode::Goto),
            0x07 => Some(OpCode::AddBy),
            0x08 => Some(OpCode::SubBy),
            0x09 => Some(OpCode::MulBy),
            0x0A => Some(OpCode::DivBy),
            0x0B => Some(OpCode::ModBy),
            0x0C => Some(OpCode::Eq),
            0x0D => Some(OpCode::Ne),
            0x0E => Some(OpCode::Gt),
            0x0F => Some(OpCode::Lt),
            0x10 => Some(OpCode::Ge),
            0x11 => Some(OpCode::Le),
            0x12 => Some(OpCode::And),
            0x13 => Some(OpCode::Or),
            0x14 => Some(OpCode::Not),
            0x15 => Some(OpCode::Neg),
            0x16 => Some(OpCode::GotoIfN),
            0x17 => Some(OpCode::Timer),
            0x18 => Some(OpCode::BwAnd),
            0x19 => Some(OpCode::BwOr),
            0x1A => Some(OpCode::BwXor),
            0x1B => Some(OpCode::BwNot),
            0x1C => Some(OpCode::BwShl),
            0x1D => Some(OpCode::BwShr),
            0x1E => Some(OpCode::QcGet),
            0x1F => Some(OpCode::QcSet),
            0x20 => Some(OpCode::QcClr),
            0x21 => Some(OpCode::StrCat),
            _ => None,
        }
    }

    /// Convert opcode to byte value
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            OpCode::Nop => "NOP",
            OpCode::Done => "DONE",
            OpCode::GoStage => "GOSTAGE",
            OpCode::Play => "PLAY",
            OpCode::Cue => "CUE",
            OpCode::SetVar => "SETVAR",
            OpCode::Goto => "GOTO",
            OpCode::AddBy => "ADDBY",
            OpCode::SubBy => "SUBBY",
            OpCode::MulBy => "MULBY",
            OpCode::DivBy => "DIVBY",
            OpCode::ModBy => "MODBY",
            OpCode::Eq => "EQ",
            OpCode::Ne => "NE",
            OpCode::Gt => "GT",
            OpCode::Lt => "LT",
            OpCode::Ge => "GE",
            OpCode::Le => "LE",
            OpCode::And => "AND",
            OpCode::Or => "OR",
            OpCode::Not => "NOT",
            OpCode::Neg => "NEG",
            OpCode::GotoIfN => "GOTOIFN",
            OpCode::Timer => "TIMER",
            OpCode::BwAnd => "BWAND",
            OpCode::BwOr => "BWOR",
            OpCode::BwXor => "BWXOR",
            OpCode::BwNot => "BWNOT",
            OpCode::BwShl => "BWSHL",
            OpCode::BwShr => "BWSHR",
            OpCode::QcGet => "QCGET",
            OpCode::QcSet => "QCSET",
            OpCode::QcClr => "QCCLR",
            OpCode::StrCat => "STRCAT",
        }
    }

    /// Unary operators read only `op2`
    pub fn is_unary(self) -> bool {
        matches!(self, OpCode::Not | OpCode::Neg | OpCode::BwNot | OpCode::QcGet)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Instruction encoding/decoding utilities
pub mod instruction {
    use byteorder::{ByteOrder, LittleEndian};

    /// Encoded instruction width in bytes
    pub const SIZE: usize = 10;

    /// Flag bits of the second instruction byte
    pub mod flags {
        /// Operands are integers
        pub const INT: u8 = 0x01;
        /// Operands are strings
        pub const STR: u8 = 0x02;
        /// arg1 is a literal value rather than a pointer
        pub const LITERAL_ARG1: u8 = 0x04;
        /// arg2 is a literal value rather than a pointer
        pub const LITERAL_ARG2: u8 = 0x08;
    }

    /// A decoded but not yet validated instruction
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Instruction {
        pub opcode: u8,
        pub flags: u8,
        pub arg1: u32,
        pub arg2: u32,
    }

    impl Instruction {
        pub fn new(opcode: u8, flags: u8, arg1: u32, arg2: u32) -> Self {
            Self {
                opcode,
                flags,
                arg1,
                arg2,
            }
        }

        pub fn has_flag(&self, flag: u8) -> bool {
            self.flags & flag != 0
        }

        /// Decode instruction bytes
        pub fn decode(bytes: &[u8; SIZE]) -> Self {
            Self {
                opcode: bytes[0],
                flags: bytes[1],
                arg1: LittleEndian::read_u32(&bytes[2..6]),
                arg2: LittleEndian::read_u32(&bytes[6..10]),
            }
        }

        /// Encode instruction bytes
        pub fn encode(&self) -> [u8; SIZE] {
            let mut bytes = [0u8; SIZE];
            bytes[0] = self.opcode;
            bytes[1] = self.flags;
            LittleEndian::write_u32(&mut bytes[2..6], self.arg1);
            LittleEndian::write_u32(&mut bytes[6..10], self.arg2);
            bytes
        }
    }
}
