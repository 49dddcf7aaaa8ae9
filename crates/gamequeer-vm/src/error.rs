//! Error types for memory access, content and cartridge loading

use gamequeer_types::{DecodeError, GamePtr, Namespace, PointerError};
use thiserror::Error;

/// A rejected access to namespaced memory
///
/// Memory faults are always recoverable: the caller skips the operation that
/// triggered them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryFault {
    /// Access through the null pointer
    #[error("null pointer access")]
    Null,

    /// Access extending past the end of its region
    #[error("{len} byte access at {ptr} overruns the {size} byte region")]
    OutOfBounds {
        ptr: GamePtr,
        len: usize,
        size: usize,
    },

    /// Write to a read-only region
    #[error("{0} region is read-only")]
    ReadOnly(Namespace),

    /// Namespace with no backing storage
    #[error("{0} namespace is not addressable")]
    NotAddressable(Namespace),

    /// Pointer arithmetic left the 24-bit offset space
    #[error(transparent)]
    Pointer(#[from] PointerError),
}

/// A fault caused by malformed or unsupported cartridge content
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentFault {
    #[error("unknown opcode 0x{opcode:02x} at {at}")]
    UnknownOpcode { opcode: u8, at: GamePtr },

    #[error("bad pointer 0x{raw:08x}: {source}")]
    BadPointer {
        raw: u32,
        #[source]
        source: PointerError,
    },

    #[error("SETVAR with unsupported type flags 0x{0:02x}")]
    AssignmentFlags(u8),

    #[error("script exceeded its budget of {0} instructions")]
    BudgetExhausted(u32),

    #[error("animation slot {0} does not exist")]
    BadSlot(i32),

    #[error("{0} has no frames")]
    NoFrames(&'static str),

    #[error("badge bit {0} is outside the persistent block")]
    BadgeIndex(i32),

    #[error("cartridge declares no persistent block")]
    NoPersistentBlock,

    #[error("{ptr} is not a {expected} pointer")]
    WrongNamespace { ptr: GamePtr, expected: Namespace },

    #[error("persistent block at {start} ends before it begins ({end})")]
    PersistentLayout { start: GamePtr, end: GamePtr },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Memory(#[from] MemoryFault),
}

/// Why a cartridge could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("cartridge image is {0} bytes, too small for a header")]
    TooSmall(usize),

    #[error("bad cartridge magic {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("header checksum mismatch: stored 0x{stored:04x}, computed 0x{computed:04x}")]
    Checksum { stored: u16, computed: u16 },

    #[error("cartridge image of {size} bytes does not fit the 24-bit cartridge namespace")]
    TooLarge { size: usize },

    #[error("cartridge has no starting stage")]
    NoStartingStage,

    #[error("stage at {ptr} could not be loaded: {source}")]
    Stage {
        ptr: GamePtr,
        #[source]
        source: ContentFault,
    },

    #[error("startup code requested an unload")]
    Unloaded,

    #[error("persistent block could not be prepared: {0}")]
    Persistent(#[source] ContentFault),

    #[error(transparent)]
    Header(#[from] DecodeError),
}
