//! Badge bit instruction execution

use crate::engine::Engine;
use crate::error::ContentFault;
use crate::opcode::{instruction::Instruction, OpCode};
use crate::vm::ops::IntOperations;
use crate::vm::result::ExecutionResult;

impl Engine {
    pub(crate) fn execute_badges(
        &mut self,
        opcode: OpCode,
        instruction: &Instruction,
    ) -> Result<ExecutionResult, ContentFault> {
        let index = self.operand2(instruction)?;
        match opcode {
            OpCode::QcGet => {
                let bit = self.badge_bit(index)?;
                self.store_result(instruction, IntOperations::truth(bit))?;
            }
            OpCode::QcSet => self.set_badge_bit(index, true)?,
            OpCode::QcClr => self.set_badge_bit(index, false)?,
            _ => unreachable!("Non-badge opcode in badge handler"),
        }
        Ok(ExecutionResult::Continue)
    }
}
