//! Persistent block and badge bits
//!
//! The header's `persistent_vars` pointer names the cartridge defaults of a
//! block that lives at the same offset in the save region. The block ends at
//! the `persistent_crc16` offset, where the save region stores a CRC-16 of
//! the block as an int. The first 256 bits of the block are badge bits.

use crate::codec::{load_int, store_int};
use crate::engine::Engine;
use crate::error::{ContentFault, MemoryFault};
use gamequeer_types::crc::crc16;
use gamequeer_types::layout::{BADGE_BIT_COUNT, INT_SIZE};
use gamequeer_types::{GamePtr, Namespace};
use tracing::{debug, info, warn};

/// Location of the persistent block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistentBlock {
    /// Default contents in the cartridge
    pub defaults: GamePtr,
    /// Live contents in the save region
    pub live: GamePtr,
    /// Stored CRC of the live contents
    pub crc: GamePtr,
    pub len: usize,
}

impl PersistentBlock {
    /// Resolve the block from the header's two pointers.
    ///
    /// Returns `Ok(None)` when the cartridge declares no block.
    pub fn from_header(vars: GamePtr, crc: GamePtr) -> Result<Option<Self>, ContentFault> {
        if vars.is_null() {
            return Ok(None);
        }
        for ptr in [vars, crc] {
            if ptr.namespace() != Namespace::Cart {
                return Err(ContentFault::WrongNamespace {
                    ptr,
                    expected: Namespace::Cart,
                });
            }
        }
        let start = vars.offset();
        let end = crc.offset();
        if end <= start {
            return Err(ContentFault::PersistentLayout {
                start: vars,
                end: crc,
            });
        }
        Ok(Some(Self {
            defaults: vars,
            live: GamePtr::Save(start),
            crc: GamePtr::Save(end),
            len: (end.get() - start.get()) as usize,
        }))
    }
}

impl Engine {
    pub fn persistent_block(&self) -> Option<PersistentBlock> {
        let header = self.header.as_ref()?;
        PersistentBlock::from_header(header.persistent_vars, header.persistent_crc16)
            .ok()
            .flatten()
    }

    fn resolve_persistent_block(&self) -> Result<Option<PersistentBlock>, ContentFault> {
        match &self.header {
            Some(header) => {
                PersistentBlock::from_header(header.persistent_vars, header.persistent_crc16)
            }
            None => Ok(None),
        }
    }

    fn block_crc(&self, block: &PersistentBlock) -> Result<u16, ContentFault> {
        let bytes = self.memory.read_vec(block.live, block.len)?;
        Ok(crc16(&bytes))
    }

    /// Re-seed the live block from cartridge defaults unless its stored CRC
    /// matches its contents.
    pub(crate) fn seed_persistent(&mut self) -> Result<(), ContentFault> {
        let Some(block) = self.resolve_persistent_block()? else {
            return Ok(());
        };
        let computed = self.block_crc(&block)?;
        let stored = load_int(&self.memory, block.crc)? as u32 & 0xFFFF;
        if stored == u32::from(computed) {
            debug!(len = block.len, "persistent block intact");
            return Ok(());
        }

        info!(
            stored,
            computed, "persistent block checksum mismatch, restoring defaults"
        );
        self.memory.copy(block.live, block.defaults, block.len)?;
        self.store_block_crc(&block)
    }

    fn store_block_crc(&mut self, block: &PersistentBlock) -> Result<(), ContentFault> {
        let crc = self.block_crc(block)?;
        store_int(&mut self.memory, block.crc, i32::from(crc))?;
        Ok(())
    }

    /// Store a fresh CRC of the persistent block if the save region changed.
    ///
    /// Returns true when the save region was dirty.
    pub fn commit_save(&mut self) -> bool {
        if !self.memory.is_save_dirty() {
            return false;
        }
        match self.resolve_persistent_block() {
            Ok(Some(block)) => {
                if let Err(fault) = self.store_block_crc(&block) {
                    warn!(%fault, "could not commit persistent block");
                }
            }
            Ok(None) => {}
            Err(fault) => warn!(%fault, "could not commit persistent block"),
        }
        self.memory.mark_save_clean();
        true
    }

    fn badge_word(&self, index: i32) -> Result<GamePtr, ContentFault> {
        let block = self
            .resolve_persistent_block()?
            .ok_or(ContentFault::NoPersistentBlock)?;
        if index < 0 || index as u32 >= BADGE_BIT_COUNT {
            return Err(ContentFault::BadgeIndex(index));
        }
        let word_offset = (index as usize / 32) * INT_SIZE;
        if word_offset + INT_SIZE > block.len {
            return Err(ContentFault::BadgeIndex(index));
        }
        Ok(block
            .live
            .add(word_offset as u32)
            .map_err(MemoryFault::from)?)
    }

    pub fn badge_bit(&self, index: i32) -> Result<bool, ContentFault> {
        let word = load_int(&self.memory, self.badge_word(index)?)?;
        Ok(word & badge_mask(index) != 0)
    }

    /// Set or clear badge bit `index`; nothing is written when the bit
    /// already holds `value`.
    pub fn set_badge_bit(&mut self, index: i32, value: bool) -> Result<(), ContentFault> {
        let ptr = self.badge_word(index)?;
        let word = load_int(&self.memory, ptr)?;
        let mask = badge_mask(index);
        let updated = if value { word | mask } else { word & !mask };
        if updated != word {
            store_int(&mut self.memory, ptr, updated)?;
            debug!(index, value, "badge bit changed");
        }
        Ok(())
    }
}

fn badge_mask(index: i32) -> i32 {
    (1u32 << (index as u32 % 32)) as i32
}
