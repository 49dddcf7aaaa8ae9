//! Stage loading and event dispatch

use crate::anim::SlotId;
use crate::codec::{load_record, FixedStr};
use crate::engine::Engine;
use crate::error::ContentFault;
use crate::host::Surface;
use crate::menu::MenuResponse;
use gamequeer_types::{BuiltinInt, BuiltinStr, EventKind, GamePtr, MenuFlag, Stage};
use tracing::{debug, trace, warn};

/// Stage changes one dispatch pass follows before leaving the rest for the
/// next pass
const MAX_STAGE_CHANGES_PER_PASS: u32 = 8;

impl Engine {
    /// Make the stage at `ptr` current.
    ///
    /// The record is read first; if that fails the previous stage stays
    /// active and untouched. A background animation or cue that cannot be
    /// started is logged and left out, the stage itself still loads.
    pub fn load_stage(&mut self, ptr: GamePtr) -> Result<(), ContentFault> {
        let stage: Stage = load_record(&self.memory, ptr)?;

        self.reset_slots();
        self.events.clear_all();
        self.close_menu();
        for label in BuiltinStr::LABELS {
            self.memory.set_builtin_str(label, &FixedStr::EMPTY);
        }
        self.memory
            .set_builtin_str(BuiltinStr::TextMenuResult, &FixedStr::EMPTY);
        self.memory.set_builtin_int(BuiltinInt::LabelFlags, 0);
        self.timer = None;

        self.stage = Some(stage.clone());
        self.stage_generation += 1;

        if let Err(fault) = self.play_animation(stage.anim_bg, SlotId::Background) {
            warn!(stage = stage.id, anim = %stage.anim_bg, %fault, "background animation skipped");
        }
        if stage.cue_bg.is_null() {
            self.leds.stop_background();
        } else if let Err(fault) = self.leds.start_cue(&self.memory, stage.cue_bg, true) {
            warn!(stage = stage.id, cue = %stage.cue_bg, %fault, "background cue skipped");
        }

        self.menu_pending = !stage.menu.is_null();
        self.events.clear_all();
        self.events.set(EventKind::Enter);
        self.events.set(EventKind::Refresh);
        debug!(stage = stage.id, %ptr, generation = self.stage_generation, "stage loaded");
        Ok(())
    }

    /// Dispatch pending events in priority order.
    ///
    /// An open menu sees each event first; only declined events reach the
    /// stage handlers. REFRESH redraws the screen instead of running code.
    /// A stage change restarts the scan so the new stage's ENTER runs before
    /// its first redraw.
    pub fn handle_events(&mut self, surface: &mut dyn Surface) {
        let mut stage_changes = 0;
        let mut index = 0;
        while let Some(kind) = EventKind::from_index(index) {
            index += 1;
            if self.unload_requested {
                return;
            }
            if !self.events.take(kind) {
                continue;
            }
            if self.menu.is_open() && self.offer_menu_event(kind) == MenuResponse::Consumed {
                trace!(%kind, "event consumed by menu");
                continue;
            }

            let generation = self.stage_generation;
            if kind == EventKind::Refresh {
                self.render(surface);
            } else {
                self.dispatch(kind);
            }

            if self.stage_generation != generation {
                stage_changes += 1;
                if stage_changes > MAX_STAGE_CHANGES_PER_PASS {
                    warn!(stage_changes, "stage change loop, deferring events to the next pass");
                    return;
                }
                index = 0;
            } else if kind == EventKind::Enter && self.menu_pending {
                self.menu_pending = false;
                self.open_stage_menu();
            }
        }
    }

    /// Run the current stage's handler for `kind`, if it has one
    fn dispatch(&mut self, kind: EventKind) {
        let Some(handler) = self.stage.as_ref().map(|stage| stage.handler(kind)) else {
            return;
        };
        if handler.is_null() {
            return;
        }
        debug!(%kind, %handler, "dispatching event");
        let outcome = self.run_code(handler);
        trace!(%kind, ?outcome, "handler finished");
    }

    fn open_stage_menu(&mut self) {
        let Some(stage) = self.stage.as_ref() else {
            return;
        };
        let (menu, prompt) = (stage.menu, stage.menu_prompt);
        let opened = match menu {
            GamePtr::MenuFlag(flag) => match MenuFlag::from_u32(flag) {
                Some(MenuFlag::TextEntry) => self.open_text_entry(prompt),
                _ => {
                    warn!(flag, "unsupported menu flag");
                    return;
                }
            },
            _ => self.open_choice_menu(menu, prompt),
        };
        if let Err(fault) = opened {
            warn!(%menu, %fault, "stage menu refused");
        }
    }
}
