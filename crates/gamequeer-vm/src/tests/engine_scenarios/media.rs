use super::helpers::*;
use crate::builder::{asm, empty_stage, CartBuilder, FrameData};
use crate::host::DrawCommand;
use crate::OpCode;
use gamequeer_types::layout::LED_COUNT;
use gamequeer_types::{BuiltinInt, EventKind, GamePtr, LedCue, LedCueFrame, Rgb};

const RED: Rgb = Rgb::new(255, 0, 0);
const BLUE: Rgb = Rgb::new(0, 0, 255);

fn frames(count: usize) -> Vec<FrameData> {
    (0..count)
        .map(|i| FrameData::uncompressed(vec![i as u8, 0xFF]))
        .collect()
}

fn solid(color: Rgb, duration: u16) -> LedCueFrame {
    LedCueFrame {
        duration,
        flags: 0,
        colors: [color; LED_COUNT],
    }
}

#[test]
fn test_background_animation_raises_bgdone_once() {
    let mut cart = CartBuilder::new(1, "Anim");
    let anim = cart.add_animation(8, 2, 10, &frames(4));
    let done = cart.add_code(&[asm::op_lit(OpCode::AddBy, heap(0), 1), asm::done()]);
    let mut stage = empty_stage(1);
    stage.anim_bg = anim;
    stage.event_commands[EventKind::BgDone.index()] = done;
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);

    let mut engine = load(&cart);
    dispatch(&mut engine);
    assert!(engine.anim_slot(0).unwrap().in_use());

    run_ticks(&mut engine, 39);
    assert_eq!(heap_int(&engine, 0), 0);
    assert_eq!(engine.anim_slot(0).unwrap().frame, 3);

    run_ticks(&mut engine, 1);
    assert_eq!(heap_int(&engine, 0), 1);
    assert!(!engine.anim_slot(0).unwrap().in_use());

    run_ticks(&mut engine, 40);
    assert_eq!(heap_int(&engine, 0), 1);
}

#[test]
fn test_background_slot_draws_opaque() {
    let mut cart = CartBuilder::new(1, "Opaque");
    let anim = cart.add_animation(8, 2, 10, &frames(1));
    let enter = cart.add_code(&[
        asm::set_int(BuiltinInt::BgX.ptr(), 12),
        asm::play(anim, 1),
        asm::done(),
    ]);
    let mut stage = empty_stage(1);
    stage.anim_bg = anim;
    stage.event_commands[EventKind::Enter.index()] = enter;
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);

    let mut engine = load(&cart);
    let surface = dispatch(&mut engine);

    let images: Vec<(i32, bool)> = surface
        .last_frame()
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Image { x, transparent, .. } => Some((*x, *transparent)),
            _ => None,
        })
        .collect();
    assert_eq!(images, vec![(12, false), (0, true)]);
}

#[test]
fn test_play_with_bad_slot_is_skipped() {
    let mut cart = CartBuilder::new(1, "Slots");
    let anim = cart.add_animation(8, 2, 1, &frames(2));
    let code = cart.add_code(&[
        asm::play(anim, 9),
        asm::play(anim, 2),
        asm::play(GamePtr::Null, 3),
        asm::set_int(heap(0), 1),
        asm::done(),
    ]);
    let mut stage = empty_stage(1);
    stage.event_commands[EventKind::ButtonA.index()] = code;
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);

    let mut engine = load(&cart);
    dispatch(&mut engine);
    engine.raise(EventKind::ButtonA);
    dispatch(&mut engine);

    assert_eq!(heap_int(&engine, 0), 1);
    assert!(engine.anim_slot(2).unwrap().in_use());
    assert!(!engine.anim_slot(3).unwrap().in_use());
}

#[test]
fn test_foreground_cue_interrupts_and_resumes_background() {
    let mut cart = CartBuilder::new(1, "Lights");
    let ambient = cart.add_cue(LedCue::FLAG_LOOP, &[solid(RED, 2)]);
    let flash = cart.add_cue(0, &[solid(BLUE, 1)]);
    let on_a = cart.add_code(&[asm::cue(flash), asm::done()]);
    let mut stage = empty_stage(1);
    stage.cue_bg = ambient;
    stage.event_commands[EventKind::ButtonA.index()] = on_a;
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);

    let mut engine = load(&cart);
    dispatch(&mut engine);
    let divider = engine.config().led_divider as usize;

    run_ticks(&mut engine, divider);
    assert_eq!(engine.led_colors(), [RED; LED_COUNT]);

    engine.raise(EventKind::ButtonA);
    dispatch(&mut engine);
    assert!(engine.leds().suspended().is_some());

    run_ticks(&mut engine, divider);
    assert_eq!(engine.led_colors(), [BLUE; LED_COUNT]);

    run_ticks(&mut engine, divider);
    assert_eq!(engine.led_colors(), [RED; LED_COUNT]);
    assert!(engine.leds().active().is_some_and(|cue| cue.background));
}

#[test]
fn test_stage_without_cue_stops_background_cue() {
    let mut cart = CartBuilder::new(1, "Dark");
    let ambient = cart.add_cue(LedCue::FLAG_LOOP, &[solid(RED, 2)]);
    let second = cart.reserve_stage();
    let leave = cart.add_code(&[asm::go_stage(second), asm::done()]);
    let mut first = empty_stage(1);
    first.cue_bg = ambient;
    first.event_commands[EventKind::ButtonB.index()] = leave;
    let first = cart.add_stage(&first);
    cart.set_stage(second, &empty_stage(2));
    cart.starting_stage(first);

    let mut engine = load(&cart);
    dispatch(&mut engine);
    let divider = engine.config().led_divider as usize;
    run_ticks(&mut engine, divider);
    assert_eq!(engine.led_colors(), [RED; LED_COUNT]);

    engine.raise(EventKind::ButtonB);
    dispatch(&mut engine);
    assert!(engine.leds().active().is_none());
    assert_eq!(engine.led_colors(), [Rgb::BLACK; LED_COUNT]);
}
