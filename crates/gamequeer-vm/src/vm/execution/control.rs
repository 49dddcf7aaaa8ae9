//! Control flow instruction execution

use crate::engine::Engine;
use crate::error::ContentFault;
use crate::opcode::{instruction::Instruction, OpCode};
use crate::vm::ops::arg_ptr;
use crate::vm::result::ExecutionResult;
use tracing::warn;

impl Engine {
    /// Execute control flow instructions
    pub(crate) fn execute_control(
        &mut self,
        opcode: OpCode,
        instruction: &Instruction,
    ) -> Result<ExecutionResult, ContentFault> {
        match opcode {
            OpCode::Nop => Ok(ExecutionResult::Continue),

            OpCode::Done => Ok(ExecutionResult::Done),

            OpCode::Goto => Ok(ExecutionResult::Jump(arg_ptr(instruction.arg1)?)),

            OpCode::GotoIfN => {
                let target = arg_ptr(instruction.arg1)?;
                if self.operand2(instruction)? == 0 {
                    Ok(ExecutionResult::Jump(target))
                } else {
                    Ok(ExecutionResult::Continue)
                }
            }

            // The script ends here whether or not the stage could be loaded
            OpCode::GoStage => {
                let target = arg_ptr(instruction.arg1)?;
                match self.load_stage(target) {
                    Ok(()) => Ok(ExecutionResult::StageChanged),
                    Err(fault) => {
                        warn!(stage = %target, %fault, "GOSTAGE failed, staying on the current stage");
                        Ok(ExecutionResult::Done)
                    }
                }
            }

            _ => unreachable!("Non-control opcode in control handler"),
        }
    }
}
