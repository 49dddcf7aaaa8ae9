use super::helpers::*;
use crate::builder::{asm, empty_stage, CartBuilder};
use crate::host::{ManualClock, RecordingLeds, RecordingSurface, ScriptedInput};
use crate::opcode::instruction::Instruction;
use crate::{OpCode, Runtime, StepOutcome};
use gamequeer_types::layout::LED_COUNT;
use gamequeer_types::{EventKind, LedCue, LedCueFrame, Rgb};
use std::time::Duration;

type TestRuntime = Runtime<RecordingSurface, ScriptedInput, RecordingLeds, ManualClock>;

fn runtime(cart: &CartBuilder, keys: &str) -> TestRuntime {
    Runtime::new(
        load(cart),
        RecordingSurface::new(),
        ScriptedInput::from_keys(keys).unwrap(),
        RecordingLeds::default(),
        ManualClock::default(),
    )
}

fn counter_cart() -> CartBuilder {
    let mut cart = CartBuilder::new(1, "Counter");
    let on_a = cart.add_code(&[asm::op_lit(OpCode::AddBy, heap(0), 1), asm::done()]);
    let on_r = cart.add_code(&[asm::op_lit(OpCode::AddBy, heap(4), 1), asm::done()]);
    let mut stage = empty_stage(1);
    stage.event_commands[EventKind::ButtonA.index()] = on_a;
    stage.event_commands[EventKind::ButtonR.index()] = on_r;
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);
    cart
}

#[test]
fn test_scripted_input_drives_handlers() {
    let mut rt = runtime(&counter_cart(), "l.ldl");
    let summary = rt.run(Some(8));

    assert_eq!(summary.ticks, 8);
    assert!(!summary.unloaded);
    assert_eq!(heap_int(rt.engine(), 0), 3);
    assert_eq!(heap_int(rt.engine(), 4), 1);
    assert_eq!(rt.surface().flushes(), 1);
}

#[test]
fn test_unload_stops_the_loop() {
    let cart = cart_with_handler(
        EventKind::ButtonB,
        &[Instruction::new(0x99, 0, 0, 0), asm::done()],
    );
    let mut rt = runtime(&cart, "..k..");
    let summary = rt.run(Some(100));
    assert!(summary.unloaded);
    assert_eq!(summary.ticks, 3);
}

#[test]
fn test_step_reports_running() {
    let mut rt = runtime(&counter_cart(), "");
    assert_eq!(rt.step(), StepOutcome::Running);
    assert_eq!(rt.engine().ticks(), 1);
}

#[test]
fn test_paced_loop_sleeps_each_period() {
    let mut rt = runtime(&counter_cart(), "").paced();
    rt.run(Some(4));
    let period = Duration::from_millis(10);
    assert_eq!(rt.clock().sleeps(), &[period, period, period]);
}

#[test]
fn test_led_updates_reach_the_sink() {
    let mut cart = CartBuilder::new(1, "Glow");
    let green = Rgb::new(0, 200, 0);
    let glow = cart.add_cue(
        LedCue::FLAG_LOOP,
        &[LedCueFrame {
            duration: 3,
            flags: 0,
            colors: [green; LED_COUNT],
        }],
    );
    let mut stage = empty_stage(1);
    stage.cue_bg = glow;
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);

    let mut rt = runtime(&cart, "");
    rt.run(Some(40));
    assert_eq!(rt.led_sink().history, vec![[green; LED_COUNT]]);
}

#[test]
fn test_save_commits_are_counted() {
    let mut cart = CartBuilder::new(1, "Saver");
    cart.persistent_block(&[0; 36]);
    let enter = cart.add_code(&[asm::qc_set(5), asm::done()]);
    let on_a = cart.add_code(&[asm::qc_set(6), asm::qc_set(6), asm::done()]);
    let mut stage = empty_stage(1);
    stage.event_commands[EventKind::Enter.index()] = enter;
    stage.event_commands[EventKind::ButtonA.index()] = on_a;
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);

    let mut rt = runtime(&cart, ".l.l");
    let summary = rt.run(Some(6));
    assert_eq!(summary.save_commits, 2);
    assert!(rt.engine().badge_bit(5).unwrap());
    assert!(rt.engine().badge_bit(6).unwrap());
}
