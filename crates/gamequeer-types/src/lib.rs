//! Gamequeer shared types
//!
//! Everything in this crate describes *data*: how a 32-bit game pointer is
//! tagged with the memory region it refers to, how the fixed-layout records
//! of a cartridge image are laid out on disk, which events the engine knows
//! about, and which built-in variable slots content may address.
//!
//! # Modules
//!
//! - `pointer`: tagged game pointers and their namespaces
//! - `layout`: scalar sizes, magic numbers and capacity limits
//! - `records`: header, stage, animation, LED cue and menu records
//! - `event`: event kinds and the pending-event vector
//! - `builtins`: built-in integer and string variable slots
//! - `crc`: CRC-16 used by the header and the persistent block

pub mod builtins;
pub mod crc;
pub mod event;
pub mod layout;
pub mod pointer;
pub mod records;

pub use builtins::{BuiltinInt, BuiltinStr, MenuFlag};
pub use event::{EventFlags, EventKind};
pub use pointer::{GamePtr, Namespace, Offset, PointerError};
pub use records::{
    AnimFrame, Animation, DecodeError, Header, LedCue, LedCueFrame, Menu, MenuOption, Record, Rgb,
    Stage,
};
