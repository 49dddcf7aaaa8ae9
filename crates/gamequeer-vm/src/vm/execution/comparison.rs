//! Comparison and logic instruction execution

use crate::engine::Engine;
use crate::error::ContentFault;
use crate::opcode::{instruction::Instruction, OpCode};
use crate::vm::ops::IntOperations;
use crate::vm::result::ExecutionResult;

impl Engine {
    /// Execute comparison instructions
    pub(crate) fn execute_comparison(
        &mut self,
        opcode: OpCode,
        instruction: &Instruction,
    ) -> Result<ExecutionResult, ContentFault> {
        if opcode == OpCode::Not {
            let value = self.operand2(instruction)?;
            self.store_result(instruction, IntOperations::truth(value == 0))?;
            return Ok(ExecutionResult::Continue);
        }

        let (left, right) = self.binary_operands(instruction)?;
        let result = match opcode {
            OpCode::Eq => left == right,
            OpCode::Ne => left != right,
            OpCode::Gt => left > right,
            OpCode::Lt => left < right,
            OpCode::Ge => left >= right,
            OpCode::Le => left <= right,
            OpCode::And => left != 0 && right != 0,
            OpCode::Or => left != 0 || right != 0,
            _ => unreachable!("Non-comparison opcode in comparison handler"),
        };
        self.store_result(instruction, IntOperations::truth(result))?;
        Ok(ExecutionResult::Continue)
    }
}
