//! Engine context
//!
//! [`Engine`] owns every piece of mutable runtime state: namespaced memory,
//! the current stage, the event vector, animation slots, LED cue playback,
//! the menu sub-state and the one-shot timer. The VM, the stage machine and
//! both schedulers are all methods on it, so no component keeps hidden state
//! of its own.

use crate::anim::AnimSlot;
use crate::codec::FixedStr;
use crate::config::{ConfigError, EngineConfig};
use crate::error::LoadError;
use crate::leds::LedState;
use crate::memory::Memory;
use crate::menu::MenuState;
use crate::vm::RunOutcome;
use gamequeer_types::layout::{ANIM_SLOT_COUNT, LED_COUNT, MAX_OFFSET};
use gamequeer_types::{
    BuiltinInt, BuiltinStr, EventFlags, EventKind, Header, Record, Rgb, Stage,
};
use tracing::{debug, info};

pub struct Engine {
    pub(crate) config: EngineConfig,
    pub(crate) memory: Memory,
    pub(crate) header: Option<Header>,
    pub(crate) stage: Option<Stage>,
    /// Bumped on every successful stage load
    pub(crate) stage_generation: u64,
    pub(crate) events: EventFlags,
    pub(crate) anims: [AnimSlot; ANIM_SLOT_COUNT],
    pub(crate) leds: LedState,
    pub(crate) menu: MenuState,
    /// The current stage's menu opens once its ENTER dispatch finishes
    pub(crate) menu_pending: bool,
    /// Ticks left on the one-shot timer
    pub(crate) timer: Option<u32>,
    pub(crate) unload_requested: bool,
    pub(crate) ticks: u64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            memory: Memory::new(config.region_sizes()),
            leds: LedState::new(config.cue_policy),
            config,
            header: None,
            stage: None,
            stage_generation: 0,
            events: EventFlags::new(),
            anims: [AnimSlot::default(); ANIM_SLOT_COUNT],
            menu: MenuState::Closed,
            menu_pending: false,
            timer: None,
            unload_requested: false,
            ticks: 0,
        })
    }

    /// Validate a cartridge image, seed persistent state, run the startup
    /// code and enter the starting stage.
    ///
    /// On error no stage is active and the tick loop must not be entered.
    pub fn load_game(&mut self, image: Vec<u8>) -> Result<(), LoadError> {
        if image.len() < Header::SIZE {
            return Err(LoadError::TooSmall(image.len()));
        }
        if image.len() > MAX_OFFSET as usize + 1 {
            return Err(LoadError::TooLarge { size: image.len() });
        }
        let header = Header::decode(&image)?;
        if !header.has_valid_magic() {
            return Err(LoadError::BadMagic(header.magic));
        }
        let computed = Header::checksum_of(&image);
        if computed != header.crc16 {
            if self.config.verify_checksum {
                return Err(LoadError::Checksum {
                    stored: header.crc16,
                    computed,
                });
            }
            debug!(stored = header.crc16, computed, "ignoring header checksum mismatch");
        }

        self.memory.load_cart(image);
        self.reset_runtime();
        self.memory
            .set_builtin_int(BuiltinInt::BadgeId, self.config.badge_id);
        self.header = Some(header.clone());
        self.seed_persistent().map_err(LoadError::Persistent)?;

        let generation = self.stage_generation;
        if self.run_code(header.startup_code) == RunOutcome::Unloaded {
            self.stage = None;
            return Err(LoadError::Unloaded);
        }
        if self.stage_generation == generation {
            if header.starting_stage.is_null() {
                return Err(LoadError::NoStartingStage);
            }
            if let Err(source) = self.load_stage(header.starting_stage) {
                return Err(LoadError::Stage {
                    ptr: header.starting_stage,
                    source,
                });
            }
        }
        self.commit_save();

        info!(
            id = header.id,
            title = %header.title(),
            stages = header.stage_count,
            "game loaded"
        );
        Ok(())
    }

    /// Copy a save image into the save region (before [`Engine::load_game`])
    pub fn load_save(&mut self, image: &[u8]) {
        self.memory.load_save(image);
    }

    fn reset_runtime(&mut self) {
        self.memory.reset_volatile();
        self.stage = None;
        self.stage_generation = 0;
        self.events.clear_all();
        self.anims = [AnimSlot::default(); ANIM_SLOT_COUNT];
        self.leds = LedState::new(self.config.cue_policy);
        self.menu = MenuState::Closed;
        self.menu_pending = false;
        self.timer = None;
        self.unload_requested = false;
        self.ticks = 0;
    }

    /// One system tick: advance animations, the timer and (every
    /// `led_divider` ticks) LED cue playback.
    pub fn tick(&mut self) {
        self.ticks += 1;
        self.tick_animations();
        self.tick_timer();
        if self.ticks % u64::from(self.config.led_divider) == 0 {
            self.leds.tick(&self.memory);
        }
    }

    fn tick_timer(&mut self) {
        if let Some(remaining) = self.timer {
            if remaining <= 1 {
                self.timer = None;
                self.events.set(EventKind::Timer);
            } else {
                self.timer = Some(remaining - 1);
            }
        }
    }

    pub(crate) fn set_timer(&mut self, interval: i32) {
        self.timer = (interval > 0).then_some(interval as u32);
    }

    /// Raise an event (buttons, host signals)
    pub fn raise(&mut self, kind: EventKind) {
        self.events.set(kind);
    }

    pub fn events(&self) -> EventFlags {
        self.events
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// The active stage, `None` before a game is loaded
    pub fn stage(&self) -> Option<&Stage> {
        self.stage.as_ref()
    }

    pub fn stage_generation(&self) -> u64 {
        self.stage_generation
    }

    pub fn anim_slot(&self, index: usize) -> Option<&AnimSlot> {
        self.anims.get(index)
    }

    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    pub fn leds(&self) -> &LedState {
        &self.leds
    }

    pub fn led_colors(&self) -> [Rgb; LED_COUNT] {
        self.leds.colors()
    }

    /// LED colors, if they changed since the last call
    pub fn take_led_update(&mut self) -> Option<[Rgb; LED_COUNT]> {
        self.leds.take_changed().then(|| self.leds.colors())
    }

    /// Ticks left on the one-shot timer, if armed
    pub fn timer(&self) -> Option<u32> {
        self.timer
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Set when content executed an unknown opcode
    pub fn is_unload_requested(&self) -> bool {
        self.unload_requested
    }

    pub fn builtin_int(&self, slot: BuiltinInt) -> i32 {
        self.memory.builtin_int(slot)
    }

    pub fn set_builtin_int(&mut self, slot: BuiltinInt, value: i32) {
        self.memory.set_builtin_int(slot, value);
    }

    pub fn builtin_str(&self, slot: BuiltinStr) -> FixedStr {
        self.memory.builtin_str(slot)
    }

    pub fn set_builtin_str(&mut self, slot: BuiltinStr, value: &FixedStr) {
        self.memory.set_builtin_str(slot, value);
    }
}
