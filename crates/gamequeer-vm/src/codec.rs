//! Scalar and block codec over namespaced memory
//!
//! Integers are 4 bytes little-endian regardless of host byte order; strings
//! are fixed 22-byte NUL-terminated buffers. Records are copied out of memory
//! into a local buffer and decoded from there.

use crate::error::{ContentFault, MemoryFault};
use crate::memory::Memory;
use byteorder::{ByteOrder, LittleEndian};
use gamequeer_types::layout::{INT_SIZE, STR_SIZE};
use gamequeer_types::records::{fixed_to_string, string_to_fixed};
use gamequeer_types::{GamePtr, Menu, Record};
use std::fmt;

/// Most visible characters a content string can hold
pub const STR_CAPACITY: usize = STR_SIZE - 1;

pub fn load_int(mem: &Memory, ptr: GamePtr) -> Result<i32, MemoryFault> {
    let mut buf = [0u8; INT_SIZE];
    mem.read(ptr, &mut buf)?;
    Ok(LittleEndian::read_i32(&buf))
}

pub fn store_int(mem: &mut Memory, ptr: GamePtr, value: i32) -> Result<(), MemoryFault> {
    let mut buf = [0u8; INT_SIZE];
    LittleEndian::write_i32(&mut buf, value);
    mem.write(ptr, &buf)
}

pub fn load_str(mem: &Memory, ptr: GamePtr) -> Result<FixedStr, MemoryFault> {
    let mut buf = [0u8; STR_SIZE];
    mem.read(ptr, &mut buf)?;
    Ok(FixedStr::from_bytes(buf))
}

pub fn store_str(mem: &mut Memory, ptr: GamePtr, value: &FixedStr) -> Result<(), MemoryFault> {
    mem.write(ptr, value.as_bytes())
}

/// Copy a record out of memory and decode it
pub fn load_record<R: Record>(mem: &Memory, ptr: GamePtr) -> Result<R, ContentFault> {
    let bytes = mem.read_vec(ptr, R::SIZE)?;
    Ok(R::decode(&bytes)?)
}

/// Load a choice menu, refusing option counts outside the fixed capacity
pub fn load_menu(mem: &Memory, ptr: GamePtr) -> Result<Menu, ContentFault> {
    let count_bytes = mem.read_vec(ptr, INT_SIZE)?;
    let count = Menu::option_count(&count_bytes)?;
    let bytes = mem.read_vec(ptr, Menu::encoded_size(count))?;
    Ok(Menu::decode(&bytes)?)
}

/// A content string: 21 visible characters at most, always NUL-terminated
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedStr([u8; STR_SIZE]);

impl FixedStr {
    pub const EMPTY: FixedStr = FixedStr([0; STR_SIZE]);

    /// Wrap raw bytes, forcing the terminator
    pub fn from_bytes(mut bytes: [u8; STR_SIZE]) -> Self {
        bytes[STR_SIZE - 1] = 0;
        Self(bytes)
    }

    pub fn new(text: &str) -> Self {
        Self(string_to_fixed(text))
    }

    /// Decimal rendering of `value`
    pub fn from_int(value: i32) -> Self {
        Self::new(&value.to_string())
    }

    pub fn as_bytes(&self) -> &[u8; STR_SIZE] {
        &self.0
    }

    /// Number of characters before the first NUL
    pub fn len(&self) -> usize {
        self.0.iter().position(|&b| b == 0).unwrap_or(STR_CAPACITY)
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    /// The visible characters
    pub fn text(&self) -> &[u8] {
        &self.0[..self.len()]
    }

    pub fn byte(&self, index: usize) -> u8 {
        self.0.get(index).copied().unwrap_or(0)
    }

    /// Overwrite one character; the terminator slot is never touched
    pub fn set_byte(&mut self, index: usize, value: u8) {
        if index < STR_CAPACITY {
            self.0[index] = value;
        }
    }

    /// Zero everything from `index` on
    pub fn truncate(&mut self, index: usize) {
        if index < STR_SIZE {
            self.0[index..].fill(0);
        }
    }

    /// `self` followed by `other`, truncated to capacity
    pub fn concat(&self, other: &FixedStr) -> FixedStr {
        let mut out = *self;
        let start = self.len();
        let take = other.len().min(STR_CAPACITY - start);
        out.0[start..start + take].copy_from_slice(&other.text()[..take]);
        out
    }
}

impl Default for FixedStr {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for FixedStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", fixed_to_string(&self.0))
    }
}

impl fmt::Debug for FixedStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", fixed_to_string(&self.0))
    }
}
