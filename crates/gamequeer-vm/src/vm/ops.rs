//! Operand helpers and integer operations

use crate::codec::{load_int, store_int};
use crate::engine::Engine;
use crate::error::ContentFault;
use crate::opcode::instruction::{flags, Instruction};
use gamequeer_types::GamePtr;

/// Decode an instruction argument as a game pointer
pub(crate) fn arg_ptr(raw: u32) -> Result<GamePtr, ContentFault> {
    GamePtr::from_raw(raw).map_err(|source| ContentFault::BadPointer { raw, source })
}

impl Engine {
    /// The integer stored at `arg1`
    pub(crate) fn operand1(&self, instruction: &Instruction) -> Result<i32, ContentFault> {
        Ok(load_int(&self.memory, arg_ptr(instruction.arg1)?)?)
    }

    /// `arg2` itself when flagged literal, else the integer it points at
    pub(crate) fn operand2(&self, instruction: &Instruction) -> Result<i32, ContentFault> {
        if instruction.has_flag(flags::LITERAL_ARG2) {
            Ok(instruction.arg2 as i32)
        } else {
            Ok(load_int(&self.memory, arg_ptr(instruction.arg2)?)?)
        }
    }

    pub(crate) fn binary_operands(&self, instruction: &Instruction) -> Result<(i32, i32), ContentFault> {
        Ok((self.operand1(instruction)?, self.operand2(instruction)?))
    }

    /// Store an integer result at `arg1`
    pub(crate) fn store_result(&mut self, instruction: &Instruction, value: i32) -> Result<(), ContentFault> {
        let dst = arg_ptr(instruction.arg1)?;
        Ok(store_int(&mut self.memory, dst, value)?)
    }
}

/// Integer semantics shared by the arithmetic, comparison and bitwise
/// handlers. Everything wraps; nothing panics.
pub(crate) struct IntOperations;

impl IntOperations {
    pub(crate) fn div(left: i32, right: i32) -> i32 {
        if right == 0 {
            0
        } else {
            left.wrapping_div(right)
        }
    }

    pub(crate) fn rem(left: i32, right: i32) -> i32 {
        if right == 0 {
            0
        } else {
            left.wrapping_rem(right)
        }
    }

    pub(crate) fn shl(value: i32, amount: i32) -> i32 {
        match u32::try_from(amount) {
            Ok(amount) if amount < 32 => value << amount,
            _ => 0,
        }
    }

    /// Arithmetic right shift; large amounts leave only the sign
    pub(crate) fn shr(value: i32, amount: i32) -> i32 {
        match u32::try_from(amount) {
            Ok(amount) if amount < 32 => value >> amount,
            _ => value >> 31,
        }
    }

    #[inline]
    pub(crate) fn truth(condition: bool) -> i32 {
        i32::from(condition)
    }
}
