use crate::codec::{load_int, load_str, store_int, store_str, FixedStr};
use crate::error::MemoryFault;
use crate::memory::{Memory, RegionSizes};
use crate::vm::RunOutcome;
use gamequeer_types::layout::INT_SIZE;
use gamequeer_types::{GamePtr, Namespace};
use proptest::prelude::*;

const SIZES: RegionSizes = RegionSizes {
    save: 256,
    fram: 64,
    heap: 128,
};

fn writable() -> impl Strategy<Value = (Namespace, usize)> {
    prop_oneof![
        Just((Namespace::Save, SIZES.save)),
        Just((Namespace::Fram, SIZES.fram)),
        Just((Namespace::Heap, SIZES.heap)),
    ]
}

proptest! {
    #[test]
    fn prop_int_round_trip(value in any::<i32>(), (ns, size) in writable(), slot in 0usize..16) {
        let mut mem = Memory::new(SIZES);
        let offset = (slot * INT_SIZE) % (size - INT_SIZE);
        let ptr = GamePtr::new(ns, offset as u32).unwrap();
        store_int(&mut mem, ptr, value).unwrap();
        prop_assert_eq!(load_int(&mem, ptr).unwrap(), value);
    }

    #[test]
    fn prop_bytes_round_trip(
        (ns, size) in writable(),
        bytes in proptest::collection::vec(any::<u8>(), 1..32),
        offset in 0usize..256,
    ) {
        let mut mem = Memory::new(SIZES);
        let ptr = GamePtr::new(ns, offset as u32).unwrap();
        let fits = offset + bytes.len() <= size;
        let written = mem.write(ptr, &bytes);
        if fits {
            prop_assert!(written.is_ok());
            prop_assert_eq!(mem.read_vec(ptr, bytes.len()).unwrap(), bytes);
        } else {
            let is_out_of_bounds = matches!(written, Err(MemoryFault::OutOfBounds { .. }));
            prop_assert!(is_out_of_bounds);
            prop_assert!(mem.read_vec(ptr, bytes.len()).is_err());
        }
    }

    #[test]
    fn prop_strings_stay_terminated(text in "[ -~]{0,40}") {
        let mut mem = Memory::new(SIZES);
        let ptr = GamePtr::new(Namespace::Heap, 0).unwrap();
        store_str(&mut mem, ptr, &FixedStr::new(&text)).unwrap();
        let loaded = load_str(&mem, ptr).unwrap();
        let expected: String = text.chars().take(21).collect();
        prop_assert_eq!(loaded.to_string(), expected);
    }

    #[test]
    fn prop_random_bytecode_never_panics(code in proptest::collection::vec(any::<u8>(), 0..200)) {
        use crate::builder::{empty_stage, CartBuilder};
        use crate::config::EngineConfig;
        use crate::engine::Engine;

        let mut cart = CartBuilder::new(1, "Fuzz");
        let stage = cart.add_stage(&empty_stage(1));
        cart.starting_stage(stage);
        let entry = cart.add_bytes(&code);

        let config = EngineConfig { max_instructions: 500, ..EngineConfig::default() };
        let mut engine = Engine::new(config).unwrap();
        engine.load_game(cart.build().unwrap()).unwrap();
        let outcome = engine.run_code(entry);
        prop_assert_eq!(outcome == RunOutcome::Unloaded, engine.is_unload_requested());
    }
}
