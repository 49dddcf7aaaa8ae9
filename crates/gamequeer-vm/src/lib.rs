//! Gamequeer badge engine
//!
//! This crate runs Gamequeer cartridges: packed binary images holding
//! stages, animations, LED cues, menus and the bytecode that reacts to
//! events. Everything runs on one thread, driven by a fixed-rate tick.
//!
//! # Architecture
//!
//! All mutable state lives in [`Engine`]. Each tick:
//! - the animation and LED schedulers advance and may raise completion events
//! - pressed buttons become events
//! - pending events are dispatched in priority order, first to an open menu
//!   and otherwise to the current stage's bytecode handlers
//! - LED colors and the save region are flushed to the host
//!
//! Content only ever sees namespaced memory through 32-bit tagged pointers.
//! Out-of-range accesses, bad records and malformed instructions are
//! contained: the offending instruction is skipped or the slot is stopped.
//!
//! # Modules
//!
//! - `memory`: namespaced regions and bounds-checked access
//! - `codec`: scalar and fixed-string access on top of memory
//! - `opcode`: instruction set and the 10-byte instruction encoding
//! - `vm`: bytecode interpreter
//! - `stage`: stage loading and event dispatch
//! - `anim`, `leds`: animation slots and LED cue playback
//! - `menu`: choice menus and text entry
//! - `render`: screen composition for REFRESH
//! - `persist`: persistent block and badge bits
//! - `host`: traits the engine draws, reads input and sleeps through
//! - `runtime`, `timing`: the tick loop and its pacer
//! - `disasm`: bytecode listings
//! - `builder`: programmatic cartridge assembly

pub mod anim;
pub mod builder;
pub mod codec;
pub mod config;
pub mod disasm;
pub mod engine;
pub mod error;
pub mod host;
pub mod leds;
pub mod memory;
pub mod menu;
pub mod opcode;
pub mod persist;
pub mod render;
pub mod runtime;
pub mod stage;
pub mod timing;
pub mod vm;

// Re-export main types
pub use builder::CartBuilder;
pub use codec::FixedStr;
pub use config::{BackgroundCuePolicy, EngineConfig};
pub use disasm::{disassemble, disassemble_cart};
pub use engine::Engine;
pub use error::{ContentFault, LoadError, MemoryFault};
pub use opcode::OpCode;
pub use runtime::{RunSummary, Runtime, StepOutcome};
pub use vm::RunOutcome;
