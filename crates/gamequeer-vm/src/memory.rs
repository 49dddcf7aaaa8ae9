//! Namespaced memory
//!
//! Every region the engine can address lives here. A [`GamePtr`] selects the
//! region by its variant; all accesses are bounds-checked against the size of
//! that region and fail with a [`MemoryFault`] instead of touching anything
//! outside it.

use crate::codec::FixedStr;
use crate::error::MemoryFault;
use byteorder::{ByteOrder, LittleEndian};
use gamequeer_types::layout::{INT_SIZE, STR_SIZE};
use gamequeer_types::{BuiltinInt, BuiltinStr, GamePtr, Namespace};
use std::ops::Range;

/// Sizes of the writable physical regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSizes {
    pub save: usize,
    pub fram: usize,
    pub heap: usize,
}

/// Backing storage for every addressable namespace
#[derive(Debug, Clone)]
pub struct Memory {
    cart: Vec<u8>,
    save: Vec<u8>,
    fram: Vec<u8>,
    heap: Vec<u8>,
    builtin_int: [u8; BuiltinInt::TABLE_SIZE],
    builtin_str: [u8; BuiltinStr::TABLE_SIZE],
    save_dirty: bool,
}

impl Memory {
    pub fn new(sizes: RegionSizes) -> Self {
        Self {
            cart: Vec::new(),
            save: vec![0; sizes.save],
            fram: vec![0; sizes.fram],
            heap: vec![0; sizes.heap],
            builtin_int: [0; BuiltinInt::TABLE_SIZE],
            builtin_str: [0; BuiltinStr::TABLE_SIZE],
            save_dirty: false,
        }
    }

    /// Replace the cartridge image
    pub fn load_cart(&mut self, image: Vec<u8>) {
        self.cart = image;
    }

    /// Copy a save image into the save region.
    ///
    /// Shorter images leave the tail zeroed; longer ones are truncated.
    pub fn load_save(&mut self, image: &[u8]) {
        let len = image.len().min(self.save.len());
        self.save.fill(0);
        self.save[..len].copy_from_slice(&image[..len]);
        self.save_dirty = false;
    }

    pub fn cart(&self) -> &[u8] {
        &self.cart
    }

    pub fn save_image(&self) -> &[u8] {
        &self.save
    }

    /// True when the save region was written since the last
    /// [`Memory::mark_save_clean`]
    pub fn is_save_dirty(&self) -> bool {
        self.save_dirty
    }

    pub fn mark_save_clean(&mut self) {
        self.save_dirty = false;
    }

    /// Zero the heap and both built-in tables
    pub fn reset_volatile(&mut self) {
        self.heap.fill(0);
        self.builtin_int = [0; BuiltinInt::TABLE_SIZE];
        self.builtin_str = [0; BuiltinStr::TABLE_SIZE];
    }

    /// Built-in integer slot; always addressable
    pub fn builtin_int(&self, slot: BuiltinInt) -> i32 {
        let start = slot as usize * INT_SIZE;
        LittleEndian::read_i32(&self.builtin_int[start..start + INT_SIZE])
    }

    pub fn set_builtin_int(&mut self, slot: BuiltinInt, value: i32) {
        let start = slot as usize * INT_SIZE;
        LittleEndian::write_i32(&mut self.builtin_int[start..start + INT_SIZE], value);
    }

    /// Built-in string slot; always addressable
    pub fn builtin_str(&self, slot: BuiltinStr) -> FixedStr {
        let start = slot as usize * STR_SIZE;
        let mut bytes = [0u8; STR_SIZE];
        bytes.copy_from_slice(&self.builtin_str[start..start + STR_SIZE]);
        FixedStr::from_bytes(bytes)
    }

    pub fn set_builtin_str(&mut self, slot: BuiltinStr, value: &FixedStr) {
        let start = slot as usize * STR_SIZE;
        self.builtin_str[start..start + STR_SIZE].copy_from_slice(value.as_bytes());
    }

    /// Size of the region behind `ns`, if it has one
    pub fn region_size(&self, ns: Namespace) -> Option<usize> {
        self.region(ns).map(<[u8]>::len)
    }

    fn region(&self, ns: Namespace) -> Option<&[u8]> {
        match ns {
            Namespace::Cart => Some(&self.cart),
            Namespace::Save => Some(&self.save),
            Namespace::Fram => Some(&self.fram),
            Namespace::Heap => Some(&self.heap),
            Namespace::BuiltinInt => Some(&self.builtin_int),
            Namespace::BuiltinStr => Some(&self.builtin_str),
            Namespace::Null | Namespace::FrameBuffer | Namespace::MenuFlag => None,
        }
    }

    fn region_mut(&mut self, ns: Namespace) -> Option<&mut [u8]> {
        match ns {
            Namespace::Save => Some(&mut self.save),
            Namespace::Fram => Some(&mut self.fram),
            Namespace::Heap => Some(&mut self.heap),
            Namespace::BuiltinInt => Some(&mut self.builtin_int),
            Namespace::BuiltinStr => Some(&mut self.builtin_str),
            Namespace::Cart | Namespace::Null | Namespace::FrameBuffer | Namespace::MenuFlag => {
                None
            }
        }
    }

    /// Copy `buf.len()` bytes starting at `ptr` into `buf`
    pub fn read(&self, ptr: GamePtr, buf: &mut [u8]) -> Result<(), MemoryFault> {
        match ptr {
            GamePtr::Null => return Err(MemoryFault::Null),
            GamePtr::FrameBuffer(_) => {
                buf.fill(0);
                return Ok(());
            }
            _ => {}
        }
        let region = self
            .region(ptr.namespace())
            .ok_or(MemoryFault::NotAddressable(ptr.namespace()))?;
        let range = span(ptr, buf.len(), region.len())?;
        buf.copy_from_slice(&region[range]);
        Ok(())
    }

    /// Copy `bytes` into memory starting at `ptr`
    pub fn write(&mut self, ptr: GamePtr, bytes: &[u8]) -> Result<(), MemoryFault> {
        let ns = ptr.namespace();
        match ptr {
            GamePtr::Null => return Err(MemoryFault::Null),
            GamePtr::FrameBuffer(_) => return Ok(()),
            GamePtr::Cart(_) => return Err(MemoryFault::ReadOnly(ns)),
            _ => {}
        }
        let region = self
            .region_mut(ns)
            .ok_or(MemoryFault::NotAddressable(ns))?;
        let range = span(ptr, bytes.len(), region.len())?;
        region[range].copy_from_slice(bytes);
        if ns == Namespace::Save {
            self.save_dirty = true;
        }
        Ok(())
    }

    pub fn read_byte(&self, ptr: GamePtr) -> Result<u8, MemoryFault> {
        let mut byte = [0u8; 1];
        self.read(ptr, &mut byte)?;
        Ok(byte[0])
    }

    pub fn write_byte(&mut self, ptr: GamePtr, value: u8) -> Result<(), MemoryFault> {
        self.write(ptr, &[value])
    }

    /// Read `len` bytes into a fresh buffer
    pub fn read_vec(&self, ptr: GamePtr, len: usize) -> Result<Vec<u8>, MemoryFault> {
        let mut buf = vec![0u8; len];
        self.read(ptr, &mut buf)?;
        Ok(buf)
    }

    /// Copy `len` bytes from `src` to `dst`.
    ///
    /// Both ranges are validated before anything is written.
    pub fn copy(&mut self, dst: GamePtr, src: GamePtr, len: usize) -> Result<(), MemoryFault> {
        let bytes = self.read_vec(src, len)?;
        self.write(dst, &bytes)
    }
}

/// Byte range of a `len`-byte access at `ptr` inside a region of `size` bytes
fn span(ptr: GamePtr, len: usize, size: usize) -> Result<Range<usize>, MemoryFault> {
    let start = ptr.offset().as_usize();
    match start.checked_add(len) {
        Some(end) if end <= size => Ok(start..end),
        _ => Err(MemoryFault::OutOfBounds { ptr, len, size }),
    }
}
