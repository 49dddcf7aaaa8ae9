//! Bitwise instruction execution

use crate::engine::Engine;
use crate::error::ContentFault;
use crate::opcode::{instruction::Instruction, OpCode};
use crate::vm::ops::IntOperations;
use crate::vm::result::ExecutionResult;

impl Engine {
    pub(crate) fn execute_bitwise(
        &mut self,
        opcode: OpCode,
        instruction: &Instruction,
    ) -> Result<ExecutionResult, ContentFault> {
        let result = match opcode {
            OpCode::BwNot => !self.operand2(instruction)?,
            _ => {
                let (left, right) = self.binary_operands(instruction)?;
                match opcode {
                    OpCode::BwAnd => left & right,
                    OpCode::BwOr => left | right,
                    OpCode::BwXor => left ^ right,
                    OpCode::BwShl => IntOperations::shl(left, right),
                    OpCode::BwShr => IntOperations::shr(left, right),
                    _ => unreachable!("Non-bitwise opcode in bitwise handler"),
                }
            }
        };
        self.store_result(instruction, result)?;
        Ok(ExecutionResult::Continue)
    }
}
