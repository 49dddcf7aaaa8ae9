//! Arithmetic instruction execution

use crate::engine::Engine;
use crate::error::ContentFault;
use crate::opcode::{instruction::Instruction, OpCode};
use crate::vm::ops::IntOperations;
use crate::vm::result::ExecutionResult;

impl Engine {
    /// Execute arithmetic instructions
    pub(crate) fn execute_arithmetic(
        &mut self,
        opcode: OpCode,
        instruction: &Instruction,
    ) -> Result<ExecutionResult, ContentFault> {
        let result = match opcode {
            OpCode::AddBy => {
                let (left, right) = self.binary_operands(instruction)?;
                left.wrapping_add(right)
            }

            OpCode::SubBy => {
                let (left, right) = self.binary_operands(instruction)?;
                left.wrapping_sub(right)
            }

            OpCode::MulBy => {
                let (left, right) = self.binary_operands(instruction)?;
                left.wrapping_mul(right)
            }

            OpCode::DivBy => {
                let (left, right) = self.binary_operands(instruction)?;
                IntOperations::div(left, right)
            }

            OpCode::ModBy => {
                let (left, right) = self.binary_operands(instruction)?;
                IntOperations::rem(left, right)
            }

            OpCode::Neg => self.operand2(instruction)?.wrapping_neg(),

            _ => unreachable!("Non-arithmetic opcode in arithmetic handler"),
        };
        self.store_result(instruction, result)?;
        Ok(ExecutionResult::Continue)
    }
}
