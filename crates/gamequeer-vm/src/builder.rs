//! Programmatic cartridge assembly
//!
//! [`CartBuilder`] lays records out back to back after a header placeholder
//! and hands back a cartridge pointer for each one, so scripts and stages
//! can refer to each other. [`CartBuilder::build`] fills in and seals the
//! header.

use crate::codec::FixedStr;
use crate::error::LoadError;
use crate::opcode::{instruction::*, OpCode};
use gamequeer_types::layout::{INT_SIZE, MAGIC};
use gamequeer_types::records::string_to_fixed;
use gamequeer_types::{
    AnimFrame, Animation, DecodeError, EventKind, GamePtr, Header, LedCue, LedCueFrame, Menu,
    MenuOption, Offset, Record, Stage,
};

/// A stage with every pointer null
pub fn empty_stage(id: u16) -> Stage {
    Stage {
        id,
        anim_bg: GamePtr::Null,
        cue_bg: GamePtr::Null,
        menu: GamePtr::Null,
        menu_prompt: GamePtr::Null,
        event_commands: [GamePtr::Null; EventKind::COUNT],
    }
}

/// One animation frame before layout
#[derive(Debug, Clone)]
pub struct FrameData {
    pub bpp: u8,
    pub data: Vec<u8>,
}

impl FrameData {
    pub fn uncompressed(data: Vec<u8>) -> Self {
        Self {
            bpp: AnimFrame::FMT_1BPP_UNCOMP,
            data,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CartBuilder {
    id: u16,
    title: String,
    image: Vec<u8>,
    anim_count: u16,
    stage_count: u16,
    starting_stage: GamePtr,
    startup_code: GamePtr,
    persistent_vars: GamePtr,
    persistent_crc16: GamePtr,
    overflowed: bool,
}

impl CartBuilder {
    pub fn new(id: u16, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            image: vec![0; Header::SIZE],
            anim_count: 0,
            stage_count: 0,
            starting_stage: GamePtr::Null,
            startup_code: GamePtr::Null,
            persistent_vars: GamePtr::Null,
            persistent_crc16: GamePtr::Null,
            overflowed: false,
        }
    }

    /// Pointer the next appended record will get
    pub fn next_ptr(&mut self) -> GamePtr {
        match Offset::new(self.image.len() as u32) {
            Ok(offset) => GamePtr::Cart(offset),
            Err(_) => {
                self.overflowed = true;
                GamePtr::Null
            }
        }
    }

    /// Append raw bytes
    pub fn add_bytes(&mut self, bytes: &[u8]) -> GamePtr {
        let ptr = self.next_ptr();
        self.image.extend_from_slice(bytes);
        ptr
    }

    pub fn add_int(&mut self, value: i32) -> GamePtr {
        self.add_bytes(&value.to_le_bytes())
    }

    pub fn add_string(&mut self, text: &str) -> GamePtr {
        self.add_bytes(&string_to_fixed(text))
    }

    pub fn add_fixed_str(&mut self, text: &FixedStr) -> GamePtr {
        self.add_bytes(text.as_bytes())
    }

    pub fn add_code(&mut self, code: &[Instruction]) -> GamePtr {
        let ptr = self.next_ptr();
        for instruction in code {
            self.image.extend_from_slice(&instruction.encode());
        }
        ptr
    }

    pub fn add_menu(&mut self, options: &[MenuOption]) -> Result<GamePtr, DecodeError> {
        let menu = Menu::from_options(options)?;
        let mut bytes = Vec::with_capacity(Menu::encoded_size(menu.len()));
        menu.encode(&mut bytes);
        Ok(self.add_bytes(&bytes))
    }

    /// Lay out frame data, the frame table and the descriptor. Returns the
    /// descriptor pointer.
    pub fn add_animation(
        &mut self,
        width: u8,
        height: u8,
        ticks_per_frame: u16,
        frames: &[FrameData],
    ) -> GamePtr {
        let data: Vec<(u8, GamePtr, u32)> = frames
            .iter()
            .map(|frame| (frame.bpp, self.add_bytes(&frame.data), frame.data.len() as u32))
            .collect();

        let frame_pointer = self.next_ptr();
        for (bpp, data, data_size) in data {
            let record = AnimFrame {
                bpp,
                data,
                data_size,
            };
            self.image.extend_from_slice(&record.to_bytes());
        }

        let anim = Animation {
            id: self.anim_count,
            frame_count: frames.len() as u16,
            ticks_per_frame,
            flags: 0,
            width,
            height,
            frame_pointer,
        };
        self.anim_count += 1;
        self.add_bytes(&anim.to_bytes())
    }

    pub fn add_cue(&mut self, flags: u16, frames: &[LedCueFrame]) -> GamePtr {
        let first = self.next_ptr();
        for frame in frames {
            self.image.extend_from_slice(&frame.to_bytes());
        }
        let cue = LedCue {
            frame_count: frames.len() as u16,
            flags,
            frames: first,
        };
        self.add_bytes(&cue.to_bytes())
    }

    /// Space for a stage record filled in later by [`CartBuilder::set_stage`]
    pub fn reserve_stage(&mut self) -> GamePtr {
        self.stage_count += 1;
        self.add_bytes(&[0; Stage::SIZE])
    }

    pub fn set_stage(&mut self, ptr: GamePtr, stage: &Stage) {
        let start = ptr.offset().as_usize();
        if ptr.is_null() || start + Stage::SIZE > self.image.len() {
            self.overflowed = true;
            return;
        }
        self.image[start..start + Stage::SIZE].copy_from_slice(&stage.to_bytes());
    }

    pub fn add_stage(&mut self, stage: &Stage) -> GamePtr {
        let ptr = self.reserve_stage();
        self.set_stage(ptr, stage);
        ptr
    }

    pub fn starting_stage(&mut self, ptr: GamePtr) -> &mut Self {
        self.starting_stage = ptr;
        self
    }

    pub fn startup_code(&mut self, ptr: GamePtr) -> &mut Self {
        self.startup_code = ptr;
        self
    }

    /// Append the persistent block defaults followed by its CRC slot.
    /// Returns the pointer to the defaults.
    pub fn persistent_block(&mut self, defaults: &[u8]) -> GamePtr {
        let vars = self.add_bytes(defaults);
        let crc = self.add_bytes(&[0; INT_SIZE]);
        self.persistent_vars = vars;
        self.persistent_crc16 = crc;
        vars
    }

    pub fn header(&self) -> Header {
        let mut header = Header {
            magic: MAGIC,
            id: self.id,
            title: string_to_fixed(&self.title),
            anim_count: self.anim_count,
            stage_count: self.stage_count,
            starting_stage: self.starting_stage,
            startup_code: self.startup_code,
            persistent_vars: self.persistent_vars,
            persistent_crc16: self.persistent_crc16,
            color: 0,
            flags: 0,
            crc16: 0,
        };
        header.seal();
        header
    }

    /// The finished image with a sealed header
    pub fn build(&self) -> Result<Vec<u8>, LoadError> {
        if self.overflowed {
            return Err(LoadError::TooLarge {
                size: self.image.len(),
            });
        }
        let mut image = self.image.clone();
        image[..Header::SIZE].copy_from_slice(&self.header().to_bytes());
        Ok(image)
    }
}

/// Instruction constructors
pub mod asm {
    use super::*;

    /// Address of instruction `index` of the script at `base`
    pub fn at(base: GamePtr, index: usize) -> GamePtr {
        base.add((index * SIZE) as u32).unwrap_or(GamePtr::Null)
    }

    pub fn raw(opcode: OpCode, flags: u8, arg1: u32, arg2: u32) -> Instruction {
        Instruction::new(opcode.as_u8(), flags, arg1, arg2)
    }

    pub fn nop() -> Instruction {
        raw(OpCode::Nop, 0, 0, 0)
    }

    pub fn done() -> Instruction {
        raw(OpCode::Done, 0, 0, 0)
    }

    pub fn go_stage(stage: GamePtr) -> Instruction {
        raw(OpCode::GoStage, 0, stage.to_raw(), 0)
    }

    pub fn goto(target: GamePtr) -> Instruction {
        raw(OpCode::Goto, 0, target.to_raw(), 0)
    }

    /// Jump to `target` when `*cond` is zero
    pub fn goto_if_not(target: GamePtr, cond: GamePtr) -> Instruction {
        raw(OpCode::GotoIfN, 0, target.to_raw(), cond.to_raw())
    }

    pub fn play(anim: GamePtr, slot: i32) -> Instruction {
        raw(OpCode::Play, flags::LITERAL_ARG2, anim.to_raw(), slot as u32)
    }

    pub fn cue(cue: GamePtr) -> Instruction {
        raw(OpCode::Cue, 0, cue.to_raw(), 0)
    }

    pub fn timer(interval: i32) -> Instruction {
        raw(OpCode::Timer, flags::LITERAL_ARG2, 0, interval as u32)
    }

    pub fn set_int(dst: GamePtr, value: i32) -> Instruction {
        raw(OpCode::SetVar, flags::INT | flags::LITERAL_ARG2, dst.to_raw(), value as u32)
    }

    pub fn copy_int(dst: GamePtr, src: GamePtr) -> Instruction {
        raw(OpCode::SetVar, flags::INT, dst.to_raw(), src.to_raw())
    }

    pub fn copy_str(dst: GamePtr, src: GamePtr) -> Instruction {
        raw(OpCode::SetVar, flags::STR, dst.to_raw(), src.to_raw())
    }

    /// `*dst = decimal(*src)`
    pub fn int_to_str(dst: GamePtr, src: GamePtr) -> Instruction {
        raw(OpCode::SetVar, flags::INT | flags::STR, dst.to_raw(), src.to_raw())
    }

    pub fn str_cat(dst: GamePtr, src: GamePtr) -> Instruction {
        raw(OpCode::StrCat, flags::STR, dst.to_raw(), src.to_raw())
    }

    /// Binary opcode with a literal right operand
    pub fn op_lit(opcode: OpCode, dst: GamePtr, value: i32) -> Instruction {
        raw(opcode, flags::INT | flags::LITERAL_ARG2, dst.to_raw(), value as u32)
    }

    /// Binary opcode with a pointer right operand
    pub fn op(opcode: OpCode, dst: GamePtr, src: GamePtr) -> Instruction {
        raw(opcode, flags::INT, dst.to_raw(), src.to_raw())
    }

    pub fn qc_get(dst: GamePtr, bit: i32) -> Instruction {
        raw(OpCode::QcGet, flags::LITERAL_ARG2, dst.to_raw(), bit as u32)
    }

    pub fn qc_set(bit: i32) -> Instruction {
        raw(OpCode::QcSet, flags::LITERAL_ARG2, 0, bit as u32)
    }

    pub fn qc_clr(bit: i32) -> Instruction {
        raw(OpCode::QcClr, flags::LITERAL_ARG2, 0, bit as u32)
    }
}
