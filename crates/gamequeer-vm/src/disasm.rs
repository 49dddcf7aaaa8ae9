//! Bytecode disassembly

use crate::codec::load_record;
use crate::error::ContentFault;
use crate::memory::Memory;
use crate::opcode::{instruction::*, OpCode};
use gamequeer_types::layout::{INT_SIZE, STR_SIZE};
use gamequeer_types::{BuiltinInt, BuiltinStr, EventKind, GamePtr, Header, Record, Stage};
use std::collections::BTreeSet;
use std::fmt::Write;

/// Longest listing produced for a single script
const MAX_LISTING: usize = 4096;

/// Render a pointer argument, naming built-in slots
fn describe_ptr(raw: u32) -> String {
    match GamePtr::from_raw(raw) {
        Ok(GamePtr::BuiltinInt(offset)) => BuiltinInt::ALL
            .get(offset.as_usize() / INT_SIZE)
            .map(|slot| slot.name().to_string())
            .unwrap_or_else(|| format!("{}", GamePtr::BuiltinInt(offset))),
        Ok(GamePtr::BuiltinStr(offset)) => BuiltinStr::ALL
            .get(offset.as_usize() / STR_SIZE)
            .map(|slot| slot.name().to_string())
            .unwrap_or_else(|| format!("{}", GamePtr::BuiltinStr(offset))),
        Ok(ptr) => ptr.to_string(),
        Err(_) => format!("<bad 0x{raw:08x}>"),
    }
}

fn describe_flags(flags: u8) -> String {
    let mut out = String::new();
    for (bit, name) in [
        (flags::INT, "I"),
        (flags::STR, "S"),
        (flags::LITERAL_ARG1, "1"),
        (flags::LITERAL_ARG2, "2"),
    ] {
        out.push_str(if flags & bit != 0 { name } else { "-" });
    }
    out
}

/// Format one instruction without its address
pub fn format_instruction(instruction: &Instruction) -> String {
    let Some(opcode) = OpCode::from_u8(instruction.opcode) else {
        return format!("UNKNOWN(0x{:02x})", instruction.opcode);
    };
    let flags = describe_flags(instruction.flags);
    let arg = |raw: u32, literal: bool| {
        if literal {
            (raw as i32).to_string()
        } else {
            describe_ptr(raw)
        }
    };
    let arg1 = arg(instruction.arg1, instruction.has_flag(flags::LITERAL_ARG1));
    let arg2 = arg(instruction.arg2, instruction.has_flag(flags::LITERAL_ARG2));

    match opcode {
        OpCode::Nop | OpCode::Done => format!("{:<8} {}", opcode.name(), flags),
        OpCode::Goto | OpCode::GoStage | OpCode::Cue => {
            format!("{:<8} {} {}", opcode.name(), flags, arg1)
        }
        OpCode::Timer | OpCode::QcSet | OpCode::QcClr => {
            format!("{:<8} {} {}", opcode.name(), flags, arg2)
        }
        _ => format!("{:<8} {} {}, {}", opcode.name(), flags, arg1, arg2),
    }
}

/// Disassemble the script at `entry`, stopping after DONE, an unknown
/// opcode or the first unreadable instruction
pub fn disassemble(mem: &Memory, entry: GamePtr) -> String {
    let mut out = String::new();
    let mut cursor = entry;
    for _ in 0..MAX_LISTING {
        let mut bytes = [0u8; SIZE];
        if let Err(fault) = mem.read(cursor, &mut bytes) {
            let _ = writeln!(out, "{cursor}  ; {fault}");
            break;
        }
        let instruction = Instruction::decode(&bytes);
        let _ = writeln!(out, "{cursor}  {}", format_instruction(&instruction));
        match OpCode::from_u8(instruction.opcode) {
            None | Some(OpCode::Done) => break,
            Some(_) => {}
        }
        cursor = match cursor.add(SIZE as u32) {
            Ok(next) => next,
            Err(_) => break,
        };
    }
    out
}

/// Stage pointers named by GOSTAGE in the script at `entry`
fn stage_targets(mem: &Memory, entry: GamePtr) -> Vec<GamePtr> {
    let mut targets = Vec::new();
    let mut cursor = entry;
    for _ in 0..MAX_LISTING {
        let mut bytes = [0u8; SIZE];
        if mem.read(cursor, &mut bytes).is_err() {
            break;
        }
        let instruction = Instruction::decode(&bytes);
        match OpCode::from_u8(instruction.opcode) {
            None | Some(OpCode::Done) => break,
            Some(OpCode::GoStage) => {
                if let Ok(target) = GamePtr::from_raw(instruction.arg1) {
                    targets.push(target);
                }
            }
            Some(_) => {}
        }
        match cursor.add(SIZE as u32) {
            Ok(next) => cursor = next,
            Err(_) => break,
        }
    }
    targets
}

/// Disassemble the startup code and every stage reachable from the header
pub fn disassemble_cart(mem: &Memory) -> Result<String, ContentFault> {
    let header = Header::decode(mem.cart())?;
    let mut out = String::new();

    let _ = writeln!(out, "; startup code");
    if header.startup_code.is_null() {
        let _ = writeln!(out, ";   (none)");
    } else {
        out.push_str(&disassemble(mem, header.startup_code));
    }

    let mut pending: Vec<GamePtr> = stage_targets(mem, header.startup_code);
    pending.push(header.starting_stage);
    let mut seen = BTreeSet::new();
    while let Some(ptr) = pending.pop() {
        if ptr.is_null() || !seen.insert(ptr.to_raw()) {
            continue;
        }
        let stage: Stage = match load_record(mem, ptr) {
            Ok(stage) => stage,
            Err(fault) => {
                let _ = writeln!(out, "\n; stage at {ptr}: {fault}");
                continue;
            }
        };
        let _ = writeln!(out, "\n; stage {} at {ptr}", stage.id);
        for kind in EventKind::ALL {
            let handler = stage.handler(kind);
            if handler.is_null() {
                continue;
            }
            let _ = writeln!(out, "; on {kind}");
            out.push_str(&disassemble(mem, handler));
            pending.extend(stage_targets(mem, handler));
        }
    }
    Ok(out)
}
