use super::helpers::*;
use crate::builder::{asm, empty_stage, CartBuilder};
use crate::codec::FixedStr;
use crate::host::DrawCommand;
use gamequeer_types::{BuiltinInt, BuiltinStr, EventKind};

#[test]
fn test_startup_gostage_replaces_starting_stage() {
    let mut cart = CartBuilder::new(1, "Startup");
    let first = cart.add_stage(&empty_stage(1));
    let second = cart.add_stage(&empty_stage(2));
    let startup = cart.add_code(&[asm::set_int(heap(0), 11), asm::go_stage(second), asm::done()]);
    cart.starting_stage(first).startup_code(startup);

    let engine = load(&cart);
    assert_eq!(engine.stage().map(|s| s.id), Some(2));
    assert_eq!(engine.stage_generation(), 1);
    assert_eq!(heap_int(&engine, 0), 11);
}

#[test]
fn test_stage_load_clears_per_stage_builtins() {
    let mut cart = CartBuilder::new(1, "Labels");
    let second = cart.reserve_stage();
    let name = cart.add_string("title");
    let enter = cart.add_code(&[
        asm::copy_str(BuiltinStr::Label1.ptr(), name),
        asm::set_int(BuiltinInt::LabelFlags.ptr(), 1),
        asm::set_int(BuiltinInt::BgX.ptr(), 30),
        asm::timer(50),
        asm::done(),
    ]);
    let leave = cart.add_code(&[asm::go_stage(second), asm::done()]);
    let mut first = empty_stage(1);
    first.event_commands[EventKind::Enter.index()] = enter;
    first.event_commands[EventKind::ButtonB.index()] = leave;
    let first = cart.add_stage(&first);
    cart.set_stage(second, &empty_stage(2));
    cart.starting_stage(first);

    let mut engine = load(&cart);
    dispatch(&mut engine);
    assert_eq!(engine.builtin_str(BuiltinStr::Label1).to_string(), "title");
    assert_eq!(engine.timer(), Some(50));

    engine.set_builtin_str(BuiltinStr::TextMenuResult, &FixedStr::new("keep?"));
    engine.raise(EventKind::ButtonB);
    dispatch(&mut engine);

    assert_eq!(engine.stage().map(|s| s.id), Some(2));
    assert!(engine.builtin_str(BuiltinStr::Label1).is_empty());
    assert!(engine.builtin_str(BuiltinStr::TextMenuResult).is_empty());
    assert_eq!(engine.builtin_int(BuiltinInt::LabelFlags), 0);
    assert_eq!(engine.builtin_int(BuiltinInt::BgX), 0);
    assert_eq!(engine.timer(), None);
}

#[test]
fn test_events_dispatch_in_priority_order() {
    let mut cart = CartBuilder::new(1, "Order");
    let on_timer = cart.add_code(&[
        asm::op_lit(crate::OpCode::MulBy, heap(0), 10),
        asm::op_lit(crate::OpCode::AddBy, heap(0), 3),
        asm::done(),
    ]);
    let on_a = cart.add_code(&[
        asm::op_lit(crate::OpCode::MulBy, heap(0), 10),
        asm::op_lit(crate::OpCode::AddBy, heap(0), 1),
        asm::done(),
    ]);
    let on_click = cart.add_code(&[
        asm::op_lit(crate::OpCode::MulBy, heap(0), 10),
        asm::op_lit(crate::OpCode::AddBy, heap(0), 2),
        asm::done(),
    ]);
    let mut stage = empty_stage(1);
    stage.event_commands[EventKind::Timer.index()] = on_timer;
    stage.event_commands[EventKind::ButtonA.index()] = on_a;
    stage.event_commands[EventKind::Click.index()] = on_click;
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);

    let mut engine = load(&cart);
    dispatch(&mut engine);
    engine.raise(EventKind::Timer);
    engine.raise(EventKind::Click);
    engine.raise(EventKind::ButtonA);
    dispatch(&mut engine);
    assert_eq!(heap_int(&engine, 0), 123);
}

#[test]
fn test_timer_fires_once() {
    let mut cart = CartBuilder::new(1, "Timer");
    let enter = cart.add_code(&[asm::timer(3), asm::done()]);
    let fired = cart.add_code(&[asm::op_lit(crate::OpCode::AddBy, heap(0), 1), asm::done()]);
    let mut stage = empty_stage(1);
    stage.event_commands[EventKind::Enter.index()] = enter;
    stage.event_commands[EventKind::Timer.index()] = fired;
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);

    let mut engine = load(&cart);
    dispatch(&mut engine);
    run_ticks(&mut engine, 2);
    assert_eq!(heap_int(&engine, 0), 0);
    run_ticks(&mut engine, 1);
    assert_eq!(heap_int(&engine, 0), 1);
    run_ticks(&mut engine, 10);
    assert_eq!(heap_int(&engine, 0), 1);
    assert_eq!(engine.timer(), None);
}

#[test]
fn test_refresh_draws_labels() {
    let mut cart = CartBuilder::new(1, "Draw");
    let text = cart.add_string("score");
    let enter = cart.add_code(&[asm::copy_str(BuiltinStr::Label2.ptr(), text), asm::done()]);
    let mut stage = empty_stage(1);
    stage.event_commands[EventKind::Enter.index()] = enter;
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);

    let mut engine = load(&cart);
    let surface = dispatch(&mut engine);

    assert_eq!(surface.flushes(), 1);
    assert!(surface.last_frame().iter().any(|command| matches!(
        command,
        DrawCommand::Text { text, inverted: false, .. } if text == "score"
    )));
}

/// Two-stage cart: stage 1 leaves for stage 2 from the handler for `leave_on`,
/// stage 2 sets LABEL1 on ENTER
fn hello_cart(leave_on: EventKind) -> CartBuilder {
    let mut cart = CartBuilder::new(1, "Hello");
    let second = cart.reserve_stage();
    let hello = cart.add_string("hello");
    let leave = cart.add_code(&[asm::go_stage(second), asm::done()]);
    let greet = cart.add_code(&[asm::copy_str(BuiltinStr::Label1.ptr(), hello), asm::done()]);

    let mut first = empty_stage(1);
    first.event_commands[leave_on.index()] = leave;
    let first = cart.add_stage(&first);
    let mut next = empty_stage(2);
    next.event_commands[EventKind::Enter.index()] = greet;
    cart.set_stage(second, &next);
    cart.starting_stage(first);
    cart
}

fn frame_has_text(surface: &crate::host::RecordingSurface, wanted: &str) -> bool {
    surface
        .last_frame()
        .iter()
        .any(|command| matches!(command, DrawCommand::Text { text, .. } if text == wanted))
}

#[test]
fn test_stage_change_from_button_draws_after_enter() {
    let mut engine = load(&hello_cart(EventKind::ButtonA));
    dispatch(&mut engine);

    engine.raise(EventKind::ButtonA);
    let surface = dispatch(&mut engine);

    assert_eq!(engine.stage().map(|s| s.id), Some(2));
    assert_eq!(surface.flushes(), 1);
    assert!(frame_has_text(&surface, "hello"));
    assert!(engine.events().is_empty());
}

#[test]
fn test_stage_change_from_enter_draws_after_new_enter() {
    let mut engine = load(&hello_cart(EventKind::Enter));
    let surface = dispatch(&mut engine);

    assert_eq!(engine.stage().map(|s| s.id), Some(2));
    assert_eq!(surface.flushes(), 1);
    assert!(frame_has_text(&surface, "hello"));
}

#[test]
fn test_self_reentering_stage_does_not_hang() {
    let mut cart = CartBuilder::new(1, "Loop");
    let me = cart.reserve_stage();
    let again = cart.add_code(&[
        asm::op_lit(crate::OpCode::AddBy, heap(0), 1),
        asm::go_stage(me),
        asm::done(),
    ]);
    let mut stage = empty_stage(1);
    stage.event_commands[EventKind::Enter.index()] = again;
    cart.set_stage(me, &stage);
    cart.starting_stage(me);

    let mut engine = load(&cart);
    dispatch(&mut engine);
    let first_pass = heap_int(&engine, 0);
    assert!(first_pass > 1);
    assert!(engine.events().is_set(EventKind::Enter));

    dispatch(&mut engine);
    assert!(heap_int(&engine, 0) > first_pass);
}
