//! Bytecode interpreter
//!
//! The interpreter keeps no state of its own beyond the instruction cursor
//! of the running script. Every effect goes through namespaced memory or an
//! engine entry point (stage load, animation, cue, timer).

use crate::engine::Engine;
use crate::error::{ContentFault, MemoryFault};
use crate::opcode::{instruction::*, OpCode};
use gamequeer_types::GamePtr;
use tracing::{error, trace, warn};

// Module structure
mod execution;
mod ops;
mod result;

use result::ExecutionResult;

/// How a call to [`Engine::run_code`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Reached DONE (or was handed the null pointer)
    Done,
    /// GOSTAGE loaded a new stage
    StageChanged,
    /// An unknown opcode requested that the cartridge be unloaded
    Unloaded,
    /// The instruction budget ran out
    BudgetExhausted,
    /// The cursor left readable memory
    FetchFault,
}

impl Engine {
    /// Run the script at `entry` to completion.
    ///
    /// A null entry is a no-op. Faults inside a single instruction skip that
    /// instruction; the script goes on with the next one.
    pub fn run_code(&mut self, entry: GamePtr) -> RunOutcome {
        if entry.is_null() {
            return RunOutcome::Done;
        }

        let budget = self.config.max_instructions;
        let mut executed = 0u32;
        let mut cursor = entry;
        loop {
            if self.unload_requested {
                return RunOutcome::Unloaded;
            }
            if executed >= budget {
                let fault = ContentFault::BudgetExhausted(budget);
                warn!(%entry, %fault, "script cut off");
                return RunOutcome::BudgetExhausted;
            }
            executed += 1;

            let instruction = match self.fetch(cursor) {
                Ok(instruction) => instruction,
                Err(fault) => {
                    warn!(%cursor, %fault, "instruction fetch failed");
                    return RunOutcome::FetchFault;
                }
            };
            let Some(opcode) = OpCode::from_u8(instruction.opcode) else {
                let fault = ContentFault::UnknownOpcode {
                    opcode: instruction.opcode,
                    at: cursor,
                };
                error!(%fault, "cartridge is incompatible, unloading");
                self.unload_requested = true;
                return RunOutcome::Unloaded;
            };
            trace!(%cursor, %opcode, arg1 = instruction.arg1, arg2 = instruction.arg2, "execute");

            let next = match self.execute_instruction(opcode, &instruction) {
                Ok(ExecutionResult::Continue) => None,
                Ok(ExecutionResult::Jump(target)) => Some(target),
                Ok(ExecutionResult::Done) => return RunOutcome::Done,
                Ok(ExecutionResult::StageChanged) => return RunOutcome::StageChanged,
                Err(fault) => {
                    warn!(%cursor, %opcode, %fault, "instruction skipped");
                    None
                }
            };
            cursor = match next {
                Some(target) => target,
                None => match cursor.add(SIZE as u32) {
                    Ok(ptr) => ptr,
                    Err(fault) => {
                        warn!(%cursor, %fault, "script ran off its region");
                        return RunOutcome::FetchFault;
                    }
                },
            };
        }
    }

    fn fetch(&self, cursor: GamePtr) -> Result<Instruction, MemoryFault> {
        let mut bytes = [0u8; SIZE];
        self.memory.read(cursor, &mut bytes)?;
        Ok(Instruction::decode(&bytes))
    }

    /// Execute a single instruction
    fn execute_instruction(
        &mut self,
        opcode: OpCode,
        instruction: &Instruction,
    ) -> Result<ExecutionResult, ContentFault> {
        match opcode {
            // Control flow
            OpCode::Nop | OpCode::Done | OpCode::Goto | OpCode::GotoIfN | OpCode::GoStage => {
                self.execute_control(opcode, instruction)
            }

            // Arithmetic
            OpCode::AddBy
            | OpCode::SubBy
            | OpCode::MulBy
            | OpCode::DivBy
            | OpCode::ModBy
            | OpCode::Neg => self.execute_arithmetic(opcode, instruction),

            // Comparison and logic
            OpCode::Eq
            | OpCode::Ne
            | OpCode::Gt
            | OpCode::Lt
            | OpCode::Ge
            | OpCode::Le
            | OpCode::And
            | OpCode::Or
            | OpCode::Not => self.execute_comparison(opcode, instruction),

            // Bitwise
            OpCode::BwAnd
            | OpCode::BwOr
            | OpCode::BwXor
            | OpCode::BwNot
            | OpCode::BwShl
            | OpCode::BwShr => self.execute_bitwise(opcode, instruction),

            // Variables and strings
            OpCode::SetVar | OpCode::StrCat => self.execute_variables(opcode, instruction),

            // Animations, LED cues and the timer
            OpCode::Play | OpCode::Cue | OpCode::Timer => self.execute_media(opcode, instruction),

            // Badge bits
            OpCode::QcGet | OpCode::QcSet | OpCode::QcClr => self.execute_badges(opcode, instruction),
        }
    }
}
