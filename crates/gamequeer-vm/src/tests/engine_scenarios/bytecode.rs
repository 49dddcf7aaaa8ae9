use super::helpers::*;
use crate::builder::{asm, empty_stage, CartBuilder};
use crate::config::EngineConfig;
use crate::opcode::instruction::{flags, Instruction};
use crate::opcode::OpCode;
use crate::RunOutcome;
use gamequeer_types::{BuiltinStr, EventKind, GamePtr, Namespace};

#[test]
fn test_arithmetic() {
    let engine = run_enter(&[
        asm::set_int(heap(0), 7),
        asm::op_lit(OpCode::AddBy, heap(0), 5),
        asm::op_lit(OpCode::MulBy, heap(0), 3),
        asm::op_lit(OpCode::SubBy, heap(0), 1),
        asm::set_int(heap(4), 17),
        asm::op_lit(OpCode::ModBy, heap(4), 5),
        asm::set_int(heap(8), -9),
        asm::op_lit(OpCode::DivBy, heap(8), 2),
        asm::done(),
    ]);
    assert_eq!(heap_int(&engine, 0), 35);
    assert_eq!(heap_int(&engine, 4), 2);
    assert_eq!(heap_int(&engine, 8), -4);
}

#[test]
fn test_division_by_zero_yields_zero() {
    let engine = run_enter(&[
        asm::set_int(heap(0), 42),
        asm::op_lit(OpCode::DivBy, heap(0), 0),
        asm::set_int(heap(4), 42),
        asm::op_lit(OpCode::ModBy, heap(4), 0),
        asm::set_int(heap(8), i32::MIN),
        asm::op_lit(OpCode::DivBy, heap(8), -1),
        asm::done(),
    ]);
    assert_eq!(heap_int(&engine, 0), 0);
    assert_eq!(heap_int(&engine, 4), 0);
    assert_eq!(heap_int(&engine, 8), i32::MIN);
}

#[test]
fn test_comparison_and_logic() {
    let engine = run_enter(&[
        asm::set_int(heap(0), 5),
        asm::op_lit(OpCode::Gt, heap(0), 3),
        asm::set_int(heap(4), 5),
        asm::op_lit(OpCode::Le, heap(4), 4),
        asm::set_int(heap(8), 2),
        asm::op_lit(OpCode::And, heap(8), 0),
        asm::set_int(heap(12), 0),
        asm::op_lit(OpCode::Not, heap(12), 0),
        asm::set_int(heap(16), 0),
        asm::op_lit(OpCode::Neg, heap(16), 6),
        asm::done(),
    ]);
    assert_eq!(heap_int(&engine, 0), 1);
    assert_eq!(heap_int(&engine, 4), 0);
    assert_eq!(heap_int(&engine, 8), 0);
    assert_eq!(heap_int(&engine, 12), 1);
    assert_eq!(heap_int(&engine, 16), -6);
}

#[test]
fn test_bitwise() {
    let engine = run_enter(&[
        asm::set_int(heap(0), 0b1100),
        asm::op_lit(OpCode::BwXor, heap(0), 0b1010),
        asm::set_int(heap(4), 1),
        asm::op_lit(OpCode::BwShl, heap(4), 40),
        asm::set_int(heap(8), -16),
        asm::op_lit(OpCode::BwShr, heap(8), 2),
        asm::set_int(heap(12), 0),
        asm::op_lit(OpCode::BwNot, heap(12), 0),
        asm::done(),
    ]);
    assert_eq!(heap_int(&engine, 0), 0b0110);
    assert_eq!(heap_int(&engine, 4), 0);
    assert_eq!(heap_int(&engine, 8), -4);
    assert_eq!(heap_int(&engine, 12), -1);
}

#[test]
fn test_counting_loop() {
    let mut cart = CartBuilder::new(1, "Loop");
    let stage_ptr = cart.reserve_stage();
    let base = cart.next_ptr();
    let code = cart.add_code(&[
        asm::set_int(heap(0), 0),
        asm::set_int(heap(4), 10),
        asm::op(OpCode::AddBy, heap(0), heap(4)),
        asm::op_lit(OpCode::SubBy, heap(4), 1),
        asm::goto_if_not(asm::at(base, 6), heap(4)),
        asm::goto(asm::at(base, 2)),
        asm::done(),
    ]);
    let mut stage = empty_stage(1);
    stage.event_commands[EventKind::Enter.index()] = code;
    cart.set_stage(stage_ptr, &stage);
    cart.starting_stage(stage_ptr);

    let mut engine = load(&cart);
    dispatch(&mut engine);
    assert_eq!(heap_int(&engine, 0), 55);
    assert_eq!(heap_int(&engine, 4), 0);
}

#[test]
fn test_setvar_variants() {
    let mut cart = CartBuilder::new(1, "Vars");
    let greeting = cart.add_string("hello");
    let world = cart.add_string(" world");
    let code = cart.add_code(&[
        asm::set_int(heap(0), 42),
        asm::copy_int(heap(4), heap(0)),
        asm::int_to_str(BuiltinStr::Label1.ptr(), heap(0)),
        asm::copy_str(BuiltinStr::Label2.ptr(), greeting),
        asm::str_cat(BuiltinStr::Label2.ptr(), world),
        // A literal string assignment is refused and skipped
        asm::raw(
            OpCode::SetVar,
            flags::STR | flags::LITERAL_ARG2,
            BuiltinStr::Label3.ptr().to_raw(),
            7,
        ),
        asm::set_int(heap(8), 1),
        asm::done(),
    ]);
    let mut stage = empty_stage(1);
    stage.event_commands[EventKind::Enter.index()] = code;
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);

    let mut engine = load(&cart);
    dispatch(&mut engine);
    assert_eq!(heap_int(&engine, 4), 42);
    assert_eq!(engine.builtin_str(BuiltinStr::Label1).to_string(), "42");
    assert_eq!(engine.builtin_str(BuiltinStr::Label2).to_string(), "hello world");
    assert!(engine.builtin_str(BuiltinStr::Label3).is_empty());
    assert_eq!(heap_int(&engine, 8), 1);
}

#[test]
fn test_faulting_instruction_is_skipped() {
    let cart_ptr = GamePtr::new(Namespace::Cart, 0).unwrap();
    let engine = run_enter(&[
        asm::set_int(cart_ptr, 1),
        asm::set_int(GamePtr::new(Namespace::Heap, 0x00FF_FFF0).unwrap(), 1),
        asm::set_int(heap(0), 5),
        asm::done(),
    ]);
    assert_eq!(heap_int(&engine, 0), 5);
    assert!(!engine.is_unload_requested());
}

#[test]
fn test_budget_cuts_off_endless_loop() {
    let mut cart = CartBuilder::new(1, "Spin");
    let stage = cart.add_stage(&empty_stage(1));
    cart.starting_stage(stage);
    let base = cart.next_ptr();
    let spin = cart.add_code(&[asm::op_lit(OpCode::AddBy, heap(0), 1), asm::goto(base)]);

    let config = EngineConfig {
        max_instructions: 100,
        ..EngineConfig::default()
    };
    let mut engine = load_with(&cart, config);
    assert_eq!(engine.run_code(spin), RunOutcome::BudgetExhausted);
    assert_eq!(heap_int(&engine, 0), 50);
    assert!(!engine.is_unload_requested());
}

#[test]
fn test_unknown_opcode_requests_unload() {
    let mut engine = load(&cart_with_handler(
        EventKind::ButtonA,
        &[
            asm::set_int(heap(0), 1),
            Instruction::new(0x7F, 0, 0, 0),
            asm::set_int(heap(0), 2),
            asm::done(),
        ],
    ));
    dispatch(&mut engine);
    engine.raise(EventKind::ButtonA);
    engine.raise(EventKind::Timer);
    dispatch(&mut engine);

    assert!(engine.is_unload_requested());
    assert_eq!(heap_int(&engine, 0), 1);
    // Dispatch stopped before the later event
    assert!(engine.events().is_set(EventKind::Timer));
}

#[test]
fn test_running_off_the_image_stops_the_script() {
    let mut cart = CartBuilder::new(1, "Edge");
    let stage_ptr = cart.reserve_stage();
    let code = cart.add_code(&[asm::set_int(heap(0), 3)]);
    let mut stage = empty_stage(1);
    stage.event_commands[EventKind::ButtonB.index()] = code;
    cart.set_stage(stage_ptr, &stage);
    cart.starting_stage(stage_ptr);

    let mut engine = load(&cart);
    assert_eq!(engine.run_code(code), RunOutcome::FetchFault);
    assert_eq!(heap_int(&engine, 0), 3);
}

#[test]
fn test_gostage_terminates_script() {
    let mut cart = CartBuilder::new(1, "Two stages");
    let second = cart.reserve_stage();
    let enter = cart.add_code(&[
        asm::set_int(heap(0), 1),
        asm::go_stage(second),
        asm::set_int(heap(0), 99),
        asm::done(),
    ]);
    let mut first = empty_stage(1);
    first.event_commands[EventKind::Enter.index()] = enter;
    let first = cart.add_stage(&first);
    cart.set_stage(second, &empty_stage(2));
    cart.starting_stage(first);

    let mut engine = load(&cart);
    let generation = engine.stage_generation();
    dispatch(&mut engine);

    assert_eq!(heap_int(&engine, 0), 1);
    assert_eq!(engine.stage().map(|s| s.id), Some(2));
    assert_eq!(engine.stage_generation(), generation + 1);
    // The new stage's ENTER and first redraw ran in the same pass
    assert!(engine.events().is_empty());
}

#[test]
fn test_gostage_to_bad_pointer_keeps_stage() {
    let bogus = GamePtr::new(Namespace::Cart, 0x00FF_0000).unwrap();
    let engine = run_enter(&[
        asm::go_stage(bogus),
        asm::set_int(heap(0), 7),
        asm::done(),
    ]);
    assert_eq!(engine.stage().map(|s| s.id), Some(1));
    // The script ends even though the load failed
    assert_eq!(heap_int(&engine, 0), 0);
}
