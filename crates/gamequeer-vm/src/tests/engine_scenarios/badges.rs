use super::helpers::*;
use crate::builder::{asm, empty_stage, CartBuilder};
use crate::codec::load_int;
use crate::config::EngineConfig;
use crate::engine::Engine;
use gamequeer_types::crc::crc16;
use gamequeer_types::EventKind;

const BLOCK_LEN: usize = 40;

/// Cart with a persistent block whose default has badge bit 3 set, and an
/// A handler running `code`
fn badge_cart(code: &[crate::opcode::instruction::Instruction]) -> CartBuilder {
    let mut cart = CartBuilder::new(1, "Badges");
    let mut defaults = [0u8; BLOCK_LEN];
    defaults[0] = 1 << 3;
    defaults[32] = 77;
    cart.persistent_block(&defaults);
    let code = cart.add_code(code);
    let mut stage = empty_stage(1);
    stage.event_commands[EventKind::ButtonA.index()] = code;
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);
    cart
}

fn load_with_save(cart: &CartBuilder, save: &[u8]) -> Engine {
    let mut engine = Engine::new(EngineConfig::default()).unwrap();
    engine.load_save(save);
    engine.load_game(cart.build().unwrap()).unwrap();
    engine
}

#[test]
fn test_fresh_save_is_seeded_from_defaults() {
    let engine = load(&badge_cart(&[asm::done()]));
    let block = engine.persistent_block().unwrap();
    assert_eq!(block.len, BLOCK_LEN);

    assert!(engine.badge_bit(3).unwrap());
    assert!(!engine.badge_bit(4).unwrap());
    let vars = block.live.add(32).unwrap();
    assert_eq!(load_int(engine.memory(), vars).unwrap(), 77);

    let live = engine.memory().read_vec(block.live, BLOCK_LEN).unwrap();
    let stored = load_int(engine.memory(), block.crc).unwrap();
    assert_eq!(stored, i32::from(crc16(&live)));
}

#[test]
fn test_badge_opcodes_and_commit() {
    let mut engine = load(&badge_cart(&[
        asm::qc_get(heap(0), 3),
        asm::qc_get(heap(4), 200),
        asm::qc_set(200),
        asm::qc_get(heap(8), 200),
        asm::qc_clr(3),
        asm::done(),
    ]));
    dispatch(&mut engine);
    engine.raise(EventKind::ButtonA);
    dispatch(&mut engine);

    assert_eq!(heap_int(&engine, 0), 1);
    assert_eq!(heap_int(&engine, 4), 0);
    assert_eq!(heap_int(&engine, 8), 1);
    assert!(!engine.badge_bit(3).unwrap());
    assert!(engine.badge_bit(200).unwrap());

    assert!(engine.commit_save());
    assert!(!engine.commit_save());
    let block = engine.persistent_block().unwrap();
    let live = engine.memory().read_vec(block.live, BLOCK_LEN).unwrap();
    assert_eq!(
        load_int(engine.memory(), block.crc).unwrap(),
        i32::from(crc16(&live))
    );
}

#[test]
fn test_committed_save_survives_reload() {
    let cart = badge_cart(&[asm::qc_set(17), asm::done()]);
    let mut engine = load(&cart);
    dispatch(&mut engine);
    engine.raise(EventKind::ButtonA);
    dispatch(&mut engine);
    engine.commit_save();
    let save = engine.memory().save_image().to_vec();

    let reloaded = load_with_save(&cart, &save);
    assert!(reloaded.badge_bit(17).unwrap());
    assert!(reloaded.badge_bit(3).unwrap());
}

#[test]
fn test_corrupt_save_is_reseeded() {
    let cart = badge_cart(&[asm::qc_set(17), asm::done()]);
    let mut engine = load(&cart);
    dispatch(&mut engine);
    engine.raise(EventKind::ButtonA);
    dispatch(&mut engine);
    engine.commit_save();
    let mut save = engine.memory().save_image().to_vec();

    let block = engine.persistent_block().unwrap();
    save[block.live.offset().as_usize() + 10] ^= 0xFF;

    let reloaded = load_with_save(&cart, &save);
    assert!(!reloaded.badge_bit(17).unwrap());
    assert!(reloaded.badge_bit(3).unwrap());
}

#[test]
fn test_badge_faults_are_contained() {
    let mut cart = CartBuilder::new(1, "No block");
    let code = cart.add_code(&[asm::qc_set(1), asm::set_int(heap(0), 5), asm::done()]);
    let mut stage = empty_stage(1);
    stage.event_commands[EventKind::Enter.index()] = code;
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);

    let mut engine = load(&cart);
    dispatch(&mut engine);
    assert_eq!(heap_int(&engine, 0), 5);
    assert!(engine.badge_bit(1).is_err());

    let mut engine = load(&badge_cart(&[
        asm::qc_set(256),
        asm::qc_set(-1),
        asm::set_int(heap(0), 6),
        asm::done(),
    ]));
    dispatch(&mut engine);
    engine.raise(EventKind::ButtonA);
    dispatch(&mut engine);
    assert_eq!(heap_int(&engine, 0), 6);
    assert!(!engine.memory().is_save_dirty());
    assert_eq!(engine.persistent_block().map(|b| b.crc.is_null()), Some(false));
}
