//! Tagged game pointers
//!
//! A game pointer is a 32-bit value whose top byte selects a memory region
//! (namespace) and whose low 24 bits are an offset within it. On the wire it
//! stays a plain `u32`; inside the engine it is decoded into [`GamePtr`],
//! which carries the namespace as an enum variant so that every consumer has
//! to say which regions it accepts.

use crate::layout::{MAX_OFFSET, OFFSET_BITS};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Memory region selected by the top byte of a game pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Namespace {
    /// Canonical null pointer
    Null = 0x00,
    /// Cartridge ROM (read-only in the engine)
    Cart = 0x01,
    /// Save flash
    Save = 0x02,
    /// Battery-backed FRAM
    Fram = 0x03,
    /// Framebuffer, reserved and unused
    FrameBuffer = 0x04,
    /// Volatile scratch heap
    Heap = 0x05,
    /// Built-in integer table
    BuiltinInt = 0x80,
    /// Built-in string table
    BuiltinStr = 0x81,
    /// Menu-flag marker; the offset carries the flag value
    MenuFlag = 0x82,
}

impl Namespace {
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Namespace::Null),
            0x01 => Some(Namespace::Cart),
            0x02 => Some(Namespace::Save),
            0x03 => Some(Namespace::Fram),
            0x04 => Some(Namespace::FrameBuffer),
            0x05 => Some(Namespace::Heap),
            0x80 => Some(Namespace::BuiltinInt),
            0x81 => Some(Namespace::BuiltinStr),
            0x82 => Some(Namespace::MenuFlag),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Namespace::Null => "null",
            Namespace::Cart => "cart",
            Namespace::Save => "save",
            Namespace::Fram => "fram",
            Namespace::FrameBuffer => "fbuf",
            Namespace::Heap => "heap",
            Namespace::BuiltinInt => "int",
            Namespace::BuiltinStr => "str",
            Namespace::MenuFlag => "menu",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A 24-bit offset within a namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Offset(u32);

impl Offset {
    pub const ZERO: Offset = Offset(0);

    pub fn new(value: u32) -> Result<Self, PointerError> {
        if value > MAX_OFFSET {
            return Err(PointerError::OffsetOverflow(value));
        }
        Ok(Offset(value))
    }

    /// Offsets below 64 KiB always fit in 24 bits
    pub const fn from_u16(value: u16) -> Self {
        Offset(value as u32)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Advance by `delta` bytes, staying inside the 24-bit offset space
    pub fn checked_add(self, delta: u32) -> Result<Self, PointerError> {
        let value = self
            .0
            .checked_add(delta)
            .ok_or(PointerError::OffsetOverflow(u32::MAX))?;
        Offset::new(value)
    }
}

/// Errors produced while decoding or moving a game pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PointerError {
    #[error("unknown pointer namespace 0x{0:02x}")]
    UnknownNamespace(u8),

    #[error("offset 0x{0:x} does not fit in 24 bits")]
    OffsetOverflow(u32),

    #[error("null pointer cannot be offset")]
    NullOffset,
}

/// Decoded game pointer, one variant per namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePtr {
    Null,
    Cart(Offset),
    Save(Offset),
    Fram(Offset),
    FrameBuffer(Offset),
    Heap(Offset),
    BuiltinInt(Offset),
    BuiltinStr(Offset),
    MenuFlag(u32),
}

impl GamePtr {
    /// Decode a raw wire pointer.
    ///
    /// Any value with namespace byte 0 is null regardless of its offset bits.
    pub fn from_raw(raw: u32) -> Result<Self, PointerError> {
        let ns_byte = (raw >> OFFSET_BITS) as u8;
        let offset = Offset(raw & MAX_OFFSET);
        let ns = Namespace::from_u8(ns_byte).ok_or(PointerError::UnknownNamespace(ns_byte))?;
        Ok(Self::from_parts(ns, offset))
    }

    pub fn from_parts(ns: Namespace, offset: Offset) -> Self {
        match ns {
            Namespace::Null => GamePtr::Null,
            Namespace::Cart => GamePtr::Cart(offset),
            Namespace::Save => GamePtr::Save(offset),
            Namespace::Fram => GamePtr::Fram(offset),
            Namespace::FrameBuffer => GamePtr::FrameBuffer(offset),
            Namespace::Heap => GamePtr::Heap(offset),
            Namespace::BuiltinInt => GamePtr::BuiltinInt(offset),
            Namespace::BuiltinStr => GamePtr::BuiltinStr(offset),
            Namespace::MenuFlag => GamePtr::MenuFlag(offset.get()),
        }
    }

    /// Build a pointer from a namespace and a raw offset
    pub fn new(ns: Namespace, offset: u32) -> Result<Self, PointerError> {
        Ok(Self::from_parts(ns, Offset::new(offset)?))
    }

    pub fn namespace(self) -> Namespace {
        match self {
            GamePtr::Null => Namespace::Null,
            GamePtr::Cart(_) => Namespace::Cart,
            GamePtr::Save(_) => Namespace::Save,
            GamePtr::Fram(_) => Namespace::Fram,
            GamePtr::FrameBuffer(_) => Namespace::FrameBuffer,
            GamePtr::Heap(_) => Namespace::Heap,
            GamePtr::BuiltinInt(_) => Namespace::BuiltinInt,
            GamePtr::BuiltinStr(_) => Namespace::BuiltinStr,
            GamePtr::MenuFlag(_) => Namespace::MenuFlag,
        }
    }

    pub fn offset(self) -> Offset {
        match self {
            GamePtr::Null => Offset::ZERO,
            GamePtr::MenuFlag(flag) => Offset(flag & MAX_OFFSET),
            GamePtr::Cart(o)
            | GamePtr::Save(o)
            | GamePtr::Fram(o)
            | GamePtr::FrameBuffer(o)
            | GamePtr::Heap(o)
            | GamePtr::BuiltinInt(o)
            | GamePtr::BuiltinStr(o) => o,
        }
    }

    #[inline]
    pub fn is_null(self) -> bool {
        matches!(self, GamePtr::Null)
    }

    /// Encode back into the wire representation
    pub fn to_raw(self) -> u32 {
        if self.is_null() {
            return 0;
        }
        ((self.namespace().as_u8() as u32) << OFFSET_BITS) | self.offset().get()
    }

    /// Pointer `delta` bytes further into the same namespace
    pub fn add(self, delta: u32) -> Result<Self, PointerError> {
        if self.is_null() {
            return Err(PointerError::NullOffset);
        }
        let offset = self.offset().checked_add(delta)?;
        Ok(Self::from_parts(self.namespace(), offset))
    }
}

impl fmt::Display for GamePtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePtr::Null => write!(f, "null"),
            other => write!(f, "{}:{:06x}", other.namespace(), other.offset().get()),
        }
    }
}

/// True when the raw pointer's namespace byte is the null namespace
#[inline]
pub fn raw_is_null(raw: u32) -> bool {
    (raw >> OFFSET_BITS) == 0
}
