//! Animation slots and their per-tick scheduler

use crate::codec::load_record;
use crate::engine::Engine;
use crate::error::{ContentFault, MemoryFault};
use gamequeer_types::{AnimFrame, Animation, BuiltinInt, EventKind, GamePtr};
use tracing::debug;

/// The four on-screen animation slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SlotId {
    Background = 0,
    Foreground1 = 1,
    Foreground2 = 2,
    /// Mask layer drawn above the foregrounds; raises no completion event
    Overlay = 3,
}

impl SlotId {
    pub const ALL: [SlotId; 4] = [
        SlotId::Background,
        SlotId::Foreground1,
        SlotId::Foreground2,
        SlotId::Overlay,
    ];

    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Event raised when an animation in this slot finishes
    pub fn done_event(self) -> Option<EventKind> {
        match self {
            SlotId::Background => Some(EventKind::BgDone),
            SlotId::Foreground1 => Some(EventKind::Fg1Done),
            SlotId::Foreground2 => Some(EventKind::Fg2Done),
            SlotId::Overlay => None,
        }
    }

    /// Built-in X/Y position slots
    pub fn position(self) -> (BuiltinInt, BuiltinInt) {
        match self {
            SlotId::Background => (BuiltinInt::BgX, BuiltinInt::BgY),
            SlotId::Foreground1 => (BuiltinInt::Fg1X, BuiltinInt::Fg1Y),
            SlotId::Foreground2 => (BuiltinInt::Fg2X, BuiltinInt::Fg2Y),
            SlotId::Overlay => (BuiltinInt::OverlayX, BuiltinInt::OverlayY),
        }
    }
}

/// Playback state of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimSlot {
    /// Loaded descriptor; `None` when the slot is unused
    pub anim: Option<Animation>,
    pub frame: u16,
    pub ticks_remaining: u16,
}

impl AnimSlot {
    pub fn in_use(&self) -> bool {
        self.anim.is_some()
    }

    /// Advance one tick. Returns `(frame_advanced, finished)`.
    fn advance(&mut self) -> (bool, bool) {
        let Some(anim) = self.anim else {
            return (false, false);
        };
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
        if self.ticks_remaining > 0 {
            return (false, false);
        }
        self.frame += 1;
        if self.frame >= anim.frame_count {
            self.anim = None;
            return (true, true);
        }
        self.ticks_remaining = anim.ticks_per_frame.max(1);
        (true, false)
    }
}

impl Engine {
    /// Start animation `ptr` in `slot`, replacing whatever played there.
    ///
    /// A null pointer is a no-op. The whole frame table is validated before
    /// the slot changes, so a malformed animation leaves the slot as it was.
    pub fn play_animation(&mut self, ptr: GamePtr, slot: SlotId) -> Result<(), ContentFault> {
        if ptr.is_null() {
            return Ok(());
        }
        let anim: Animation = load_record(&self.memory, ptr)?;
        if anim.frame_count == 0 {
            return Err(ContentFault::NoFrames("animation"));
        }
        let last = anim
            .frame_ptr(anim.frame_count - 1)
            .map_err(MemoryFault::from)?;
        load_record::<AnimFrame>(&self.memory, last)?;

        debug!(%ptr, slot = slot.index(), frames = anim.frame_count, "animation started");
        self.anims[slot.index()] = AnimSlot {
            anim: Some(anim),
            frame: 0,
            ticks_remaining: anim.ticks_per_frame.max(1),
        };
        Ok(())
    }

    /// Empty every slot and move it back to the origin
    pub(crate) fn reset_slots(&mut self) {
        for slot in SlotId::ALL {
            self.anims[slot.index()] = AnimSlot::default();
            let (x, y) = slot.position();
            self.memory.set_builtin_int(x, 0);
            self.memory.set_builtin_int(y, 0);
        }
    }

    pub(crate) fn stop_slot(&mut self, slot: SlotId) {
        self.anims[slot.index()] = AnimSlot::default();
    }

    pub(crate) fn tick_animations(&mut self) {
        for slot in SlotId::ALL {
            let (advanced, finished) = self.anims[slot.index()].advance();
            if advanced {
                self.events.set(EventKind::Refresh);
            }
            if finished {
                debug!(slot = slot.index(), "animation finished");
                if let Some(event) = slot.done_event() {
                    self.events.set(event);
                }
            }
        }
    }
}
