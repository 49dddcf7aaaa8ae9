//! Scalar sizes, magic numbers and capacity limits shared by every record.

/// Size of a content integer (signed, little-endian)
pub const INT_SIZE: usize = 4;

/// Size of a content string, including the NUL terminator
pub const STR_SIZE: usize = 22;

/// Size of an encoded game pointer
pub const PTR_SIZE: usize = 4;

/// Cartridge magic, first four bytes of every image
pub const MAGIC: [u8; 4] = *b"GQ01";

/// Number of bits used for the offset part of a game pointer
pub const OFFSET_BITS: u32 = 24;

/// Largest offset representable in a game pointer
pub const MAX_OFFSET: u32 = (1 << OFFSET_BITS) - 1;

/// Number of physical RGB LEDs on the badge
pub const LED_COUNT: usize = 5;

/// Number of concurrent on-screen animation slots
pub const ANIM_SLOT_COUNT: usize = 4;

/// Most options a choice menu may carry
pub const MENU_MAX_OPTIONS: usize = 6;

/// Number of badge bits in the persistent block
pub const BADGE_BIT_COUNT: u32 = 256;

/// Bytes occupied by the badge-bit array at the start of the persistent block
pub const BADGE_BITS_SIZE: usize = (BADGE_BIT_COUNT as usize / 32) * INT_SIZE;

/// Screen dimensions in pixels
pub const SCREEN_W: u16 = 128;
pub const SCREEN_H: u16 = 128;
