//! Instruction execution handlers

mod arithmetic;
mod badges;
mod bitwise;
mod comparison;
mod control;
mod media;
mod variables;
