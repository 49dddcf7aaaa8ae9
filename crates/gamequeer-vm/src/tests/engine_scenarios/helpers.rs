//! Helper functions and common imports for engine scenarios.

use crate::builder::{empty_stage, CartBuilder};
use crate::codec::load_int;
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::host::RecordingSurface;
use crate::opcode::instruction::Instruction;
use gamequeer_types::{EventKind, GamePtr, Namespace};

pub fn heap(offset: u32) -> GamePtr {
    GamePtr::new(Namespace::Heap, offset).unwrap()
}

pub fn engine() -> Engine {
    Engine::new(EngineConfig::default()).unwrap()
}

/// Load `cart` into a fresh engine with the given configuration
pub fn load_with(cart: &CartBuilder, config: EngineConfig) -> Engine {
    let mut engine = Engine::new(config).unwrap();
    engine.load_game(cart.build().unwrap()).unwrap();
    engine
}

pub fn load(cart: &CartBuilder) -> Engine {
    load_with(cart, EngineConfig::default())
}

/// A single-stage cart whose handler for `kind` is `code`
pub fn cart_with_handler(kind: EventKind, code: &[Instruction]) -> CartBuilder {
    let mut cart = CartBuilder::new(1, "Scenario");
    let entry = cart.add_code(code);
    let mut stage = empty_stage(1);
    stage.event_commands[kind.index()] = entry;
    let stage = cart.add_stage(&stage);
    cart.starting_stage(stage);
    cart
}

/// Load a cart whose ENTER handler is `code` and dispatch it
pub fn run_enter(code: &[Instruction]) -> Engine {
    let mut engine = load(&cart_with_handler(EventKind::Enter, code));
    dispatch(&mut engine);
    engine
}

/// One dispatch pass, discarding what was drawn
pub fn dispatch(engine: &mut Engine) -> RecordingSurface {
    let mut surface = RecordingSurface::new();
    engine.handle_events(&mut surface);
    surface
}

/// Tick then dispatch, `n` times
pub fn run_ticks(engine: &mut Engine, n: usize) {
    let mut surface = RecordingSurface::new();
    for _ in 0..n {
        engine.tick();
        engine.handle_events(&mut surface);
    }
}

pub fn heap_int(engine: &Engine, offset: u32) -> i32 {
    load_int(engine.memory(), heap(offset)).unwrap()
}
