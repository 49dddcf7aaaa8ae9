//! Variable assignment and string instruction execution

use crate::codec::{load_str, store_int, store_str, FixedStr};
use crate::engine::Engine;
use crate::error::ContentFault;
use crate::opcode::instruction::{flags, Instruction};
use crate::opcode::OpCode;
use crate::vm::ops::arg_ptr;
use crate::vm::result::ExecutionResult;

impl Engine {
    /// Execute SETVAR and STRCAT
    pub(crate) fn execute_variables(
        &mut self,
        opcode: OpCode,
        instruction: &Instruction,
    ) -> Result<ExecutionResult, ContentFault> {
        let dst = arg_ptr(instruction.arg1)?;
        match opcode {
            OpCode::SetVar => {
                let int = instruction.has_flag(flags::INT);
                let string = instruction.has_flag(flags::STR);
                let literal = instruction.has_flag(flags::LITERAL_ARG2);
                match (int, string) {
                    // Integer rendered as decimal text
                    (true, true) => {
                        let value = self.operand2(instruction)?;
                        store_str(&mut self.memory, dst, &FixedStr::from_int(value))?;
                    }
                    (true, false) => {
                        let value = self.operand2(instruction)?;
                        store_int(&mut self.memory, dst, value)?;
                    }
                    (false, true) if !literal => {
                        let value = load_str(&self.memory, arg_ptr(instruction.arg2)?)?;
                        store_str(&mut self.memory, dst, &value)?;
                    }
                    _ => return Err(ContentFault::AssignmentFlags(instruction.flags)),
                }
                Ok(ExecutionResult::Continue)
            }

            OpCode::StrCat => {
                let left = load_str(&self.memory, dst)?;
                let right = load_str(&self.memory, arg_ptr(instruction.arg2)?)?;
                store_str(&mut self.memory, dst, &left.concat(&right))?;
                Ok(ExecutionResult::Continue)
            }

            _ => unreachable!("Non-variable opcode in variables handler"),
        }
    }
}
