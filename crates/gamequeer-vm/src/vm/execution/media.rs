//! Animation, LED cue and timer instruction execution

use crate::anim::SlotId;
use crate::engine::Engine;
use crate::error::ContentFault;
use crate::opcode::{instruction::Instruction, OpCode};
use crate::vm::ops::arg_ptr;
use crate::vm::result::ExecutionResult;

impl Engine {
    pub(crate) fn execute_media(
        &mut self,
        opcode: OpCode,
        instruction: &Instruction,
    ) -> Result<ExecutionResult, ContentFault> {
        match opcode {
            // PLAY anim, slot
            OpCode::Play => {
                let anim = arg_ptr(instruction.arg1)?;
                let index = self.operand2(instruction)?;
                let slot = SlotId::from_index(index).ok_or(ContentFault::BadSlot(index))?;
                self.play_animation(anim, slot)?;
            }

            // CUE cue; the cue's own flags decide foreground or background
            OpCode::Cue => {
                let cue = arg_ptr(instruction.arg1)?;
                self.leds.start_cue(&self.memory, cue, false)?;
            }

            OpCode::Timer => {
                let interval = self.operand2(instruction)?;
                self.set_timer(interval);
            }

            _ => unreachable!("Non-media opcode in media handler"),
        }
        Ok(ExecutionResult::Continue)
    }
}
