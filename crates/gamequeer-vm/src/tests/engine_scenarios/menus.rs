use super::helpers::*;
use crate::builder::{asm, empty_stage, CartBuilder};
use crate::menu::MenuState;
use gamequeer_types::{BuiltinInt, BuiltinStr, EventKind, MenuFlag, MenuOption};

fn menu_cart(menu_kind: Option<MenuFlag>) -> CartBuilder {
    let mut cart = CartBuilder::new(1, "Menus");
    let prompt = cart.add_string("Pick one");
    let menu = match menu_kind {
        Some(flag) => flag.ptr(),
        None => cart
            .add_menu(&[
                MenuOption::new("Red", 10),
                MenuOption::new("Green", 20),
                MenuOption::new("Blue", 30),
            ])
            .unwrap(),
    };
    let enter = cart.add_code(&[asm::set_int(heap(4), 1), asm::done()]);
    let chosen = cart.add_code(&[
        asm::copy_int(heap(0), BuiltinInt::MenuValue.ptr()),
        asm::copy_str(BuiltinStr::Label1.ptr(), BuiltinStr::TextMenuResult.ptr()),
        asm::done(),
    ]);
    let pressed_a = cart.add_code(&[asm::set_int(heap(8), 1), asm::done()]);

    let mut stage = empty_stage(1);
    stage.menu = menu;
    stage.menu_prompt = prompt;
    stage.event_commands[EventKind::Enter.index()] = enter;
    stage.event_commands[EventKind::Menu.index()] = chosen;
    stage.event_commands[EventKind::ButtonA.index()] = pressed_a;
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);
    cart
}

fn press(engine: &mut crate::Engine, kind: EventKind) {
    engine.raise(kind);
    dispatch(engine);
}

#[test]
fn test_stage_menu_opens_after_enter() {
    let mut engine = load(&menu_cart(None));
    assert!(!engine.menu().is_open());

    let surface = dispatch(&mut engine);
    assert_eq!(heap_int(&engine, 4), 1);
    assert!(matches!(engine.menu(), MenuState::Choice(_)));
    assert_eq!(engine.builtin_int(BuiltinInt::MenuActive), MenuFlag::Choice as i32);
    assert!(surface.last_frame_text().contains(&"Pick one"));
    assert!(surface.last_frame_text().contains(&">"));
}

#[test]
fn test_choice_menu_selection_reaches_menu_handler() {
    let mut engine = load(&menu_cart(None));
    dispatch(&mut engine);

    press(&mut engine, EventKind::ButtonR);
    press(&mut engine, EventKind::ButtonR);
    press(&mut engine, EventKind::ButtonR);
    press(&mut engine, EventKind::ButtonL);
    press(&mut engine, EventKind::ButtonA);

    assert_eq!(heap_int(&engine, 0), 20);
    assert!(!engine.menu().is_open());
    assert_eq!(engine.builtin_int(BuiltinInt::MenuActive), 0);
    // The menu swallowed A, so the stage handler never ran
    assert_eq!(heap_int(&engine, 8), 0);

    // Once closed, A goes to the stage again
    press(&mut engine, EventKind::ButtonA);
    assert_eq!(heap_int(&engine, 8), 1);
}

#[test]
fn test_text_entry_result() {
    let mut engine = load(&menu_cart(Some(MenuFlag::TextEntry)));
    dispatch(&mut engine);
    assert!(matches!(engine.menu(), MenuState::TextEntry(_)));
    assert_eq!(engine.builtin_int(BuiltinInt::MenuActive), MenuFlag::TextEntry as i32);

    press(&mut engine, EventKind::ButtonR);
    press(&mut engine, EventKind::ButtonR);
    press(&mut engine, EventKind::Click);
    press(&mut engine, EventKind::ButtonR);
    press(&mut engine, EventKind::Click);
    press(&mut engine, EventKind::ButtonB);
    press(&mut engine, EventKind::ButtonA);

    assert_eq!(engine.builtin_str(BuiltinStr::Label1).to_string(), "Ca");
    assert!(!engine.menu().is_open());
}

#[test]
fn test_unknown_menu_flag_is_ignored() {
    let mut cart = CartBuilder::new(1, "Odd");
    let mut stage = empty_stage(1);
    stage.menu = gamequeer_types::GamePtr::MenuFlag(7);
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);

    let mut engine = load(&cart);
    dispatch(&mut engine);
    assert!(!engine.menu().is_open());
}
