//! LED cue playback
//!
//! One cue drives the five LEDs at a time. A background cue that gets
//! interrupted by a foreground cue is parked in `suspended` together with its
//! exact frame index and elapsed ticks, and picks up from there once the
//! foreground cue finishes. Smooth frames fade linearly toward the following
//! frame; colors are accumulated in 8.8 fixed point so short fades do not
//! lose their fractional steps.

use crate::codec::load_record;
use crate::config::BackgroundCuePolicy;
use crate::error::{ContentFault, MemoryFault};
use crate::memory::Memory;
use gamequeer_types::layout::LED_COUNT;
use gamequeer_types::{GamePtr, LedCue, LedCueFrame, Rgb};
use tracing::{debug, warn};

type Channels = [[i32; 3]; LED_COUNT];

/// Frame index and elapsed LED ticks within that frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CuePosition {
    pub frame_index: u16,
    pub elapsed: u16,
}

/// A cue being played (or parked)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CuePlayback {
    pub ptr: GamePtr,
    pub cue: LedCue,
    pub background: bool,
    pub frame_index: u16,
    pub elapsed: u16,
    current: LedCueFrame,
}

impl CuePlayback {
    pub fn position(&self) -> CuePosition {
        CuePosition {
            frame_index: self.frame_index,
            elapsed: self.elapsed,
        }
    }

    fn duration(&self) -> u16 {
        self.current.duration.max(1)
    }

    /// Index of the frame after the current one, if the cue continues
    fn next_index(&self) -> Option<u16> {
        let next = self.frame_index + 1;
        if next < self.cue.frame_count {
            Some(next)
        } else if self.cue.is_looping() {
            Some(0)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct LedState {
    colors: [Rgb; LED_COUNT],
    accum: Channels,
    delta: Channels,
    active: Option<CuePlayback>,
    suspended: Option<CuePlayback>,
    policy: BackgroundCuePolicy,
    changed: bool,
}

impl LedState {
    pub fn new(policy: BackgroundCuePolicy) -> Self {
        Self {
            colors: [Rgb::BLACK; LED_COUNT],
            accum: [[0; 3]; LED_COUNT],
            delta: [[0; 3]; LED_COUNT],
            active: None,
            suspended: None,
            policy,
            changed: false,
        }
    }

    pub fn colors(&self) -> [Rgb; LED_COUNT] {
        self.colors
    }

    pub fn active(&self) -> Option<&CuePlayback> {
        self.active.as_ref()
    }

    pub fn suspended(&self) -> Option<&CuePlayback> {
        self.suspended.as_ref()
    }

    pub fn active_position(&self) -> Option<CuePosition> {
        self.active.as_ref().map(CuePlayback::position)
    }

    pub fn suspended_position(&self) -> Option<CuePosition> {
        self.suspended.as_ref().map(CuePlayback::position)
    }

    /// Report and reset whether the colors changed since the last call
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Start the cue at `ptr`.
    ///
    /// The cue plays in the background when `background` is set or the cue
    /// itself is flagged background. A background cue never pre-empts a
    /// foreground one; it is parked until the foreground cue finishes. The
    /// cue is validated before any playback state changes.
    pub fn start_cue(
        &mut self,
        mem: &Memory,
        ptr: GamePtr,
        background: bool,
    ) -> Result<(), ContentFault> {
        if ptr.is_null() {
            return Ok(());
        }
        let cue: LedCue = load_record(mem, ptr)?;
        if cue.frame_count == 0 {
            return Err(ContentFault::NoFrames("LED cue"));
        }
        let first: LedCueFrame = load_record(mem, cue.frame_ptr(0).map_err(MemoryFault::from)?)?;
        let play = CuePlayback {
            ptr,
            cue,
            background: background || cue.is_background(),
            frame_index: 0,
            elapsed: 0,
            current: first,
        };

        if play.background {
            if matches!(self.active, Some(active) if !active.background) {
                debug!(%ptr, "background cue parked behind foreground cue");
                self.suspended = Some(play);
                return Ok(());
            }
        } else if let Some(active) = self.active.take() {
            if active.background {
                match self.policy {
                    BackgroundCuePolicy::Resume => {
                        debug!(ptr = %active.ptr, frame = active.frame_index, elapsed = active.elapsed, "background cue suspended");
                        self.suspended = Some(active);
                    }
                    BackgroundCuePolicy::Discard => {
                        debug!(ptr = %active.ptr, "background cue discarded");
                    }
                }
            }
        }
        debug!(%ptr, background = play.background, frames = cue.frame_count, "cue started");
        self.active = Some(play);
        Ok(())
    }

    /// Stop a playing background cue and forget any parked one
    pub fn stop_background(&mut self) {
        self.suspended = None;
        if matches!(self.active, Some(active) if active.background) {
            debug!("background cue stopped");
            self.active = None;
            self.blackout();
        }
    }

    /// Stop everything and black out
    pub fn stop_all(&mut self) {
        self.active = None;
        self.suspended = None;
        self.blackout();
    }

    /// One LED tick
    pub fn tick(&mut self, mem: &Memory) {
        let Some(mut play) = self.active.take() else {
            return;
        };

        if play.elapsed >= play.duration() {
            let Some(next) = play.next_index() else {
                self.finish(play, mem);
                return;
            };
            match load_frame(mem, &play.cue, next) {
                Ok(frame) => {
                    play.frame_index = next;
                    play.elapsed = 0;
                    play.current = frame;
                }
                Err(fault) => {
                    warn!(ptr = %play.ptr, frame = next, %fault, "LED cue frame unreadable, cue stopped");
                    self.finish(play, mem);
                    return;
                }
            }
        }

        if play.elapsed == 0 {
            self.enter_frame(&play, mem);
        } else if play.current.is_smooth() {
            self.step_fade(1);
        }
        play.elapsed += 1;
        self.active = Some(play);
    }

    fn step_fade(&mut self, steps: i32) {
        for (acc, delta) in self.accum.iter_mut().zip(self.delta.iter()) {
            for (channel, step) in acc.iter_mut().zip(delta.iter()) {
                *channel += step * steps;
            }
        }
        self.publish();
    }

    fn finish(&mut self, play: CuePlayback, mem: &Memory) {
        debug!(ptr = %play.ptr, "cue finished");
        match self.suspended.take() {
            Some(parked) => {
                debug!(ptr = %parked.ptr, frame = parked.frame_index, elapsed = parked.elapsed, "background cue resumed");
                self.enter_frame(&parked, mem);
                if parked.current.is_smooth() && parked.elapsed > 1 {
                    self.step_fade(i32::from(parked.elapsed) - 1);
                }
                self.active = Some(parked);
            }
            None => self.blackout(),
        }
    }

    /// Snap to the current frame's colors and prepare the fade toward the
    /// following frame
    fn enter_frame(&mut self, play: &CuePlayback, mem: &Memory) {
        self.accum = to_channels(&play.current.colors);
        self.delta = [[0; 3]; LED_COUNT];
        if play.current.is_smooth() {
            if let Some(next) = play.next_index() {
                match load_frame(mem, &play.cue, next) {
                    Ok(frame) => {
                        let target = to_channels(&frame.colors);
                        let steps = i32::from(play.duration());
                        for led in 0..LED_COUNT {
                            for c in 0..3 {
                                self.delta[led][c] = (target[led][c] - self.accum[led][c]) / steps;
                            }
                        }
                    }
                    Err(fault) => warn!(ptr = %play.ptr, %fault, "fade target unreadable"),
                }
            }
        }
        self.publish();
    }

    fn blackout(&mut self) {
        self.accum = [[0; 3]; LED_COUNT];
        self.delta = [[0; 3]; LED_COUNT];
        self.publish();
    }

    fn publish(&mut self) {
        let mut colors = [Rgb::BLACK; LED_COUNT];
        for (color, acc) in colors.iter_mut().zip(self.accum.iter()) {
            let channel = |v: i32| (v >> 8).clamp(0, 255) as u8;
            *color = Rgb::new(channel(acc[0]), channel(acc[1]), channel(acc[2]));
        }
        if colors != self.colors {
            self.colors = colors;
            self.changed = true;
        }
    }
}

fn load_frame(mem: &Memory, cue: &LedCue, index: u16) -> Result<LedCueFrame, ContentFault> {
    let ptr = cue.frame_ptr(index).map_err(MemoryFault::from)?;
    load_record(mem, ptr)
}

fn to_channels(colors: &[Rgb; LED_COUNT]) -> Channels {
    let mut out = [[0; 3]; LED_COUNT];
    for (dst, color) in out.iter_mut().zip(colors.iter()) {
        *dst = [
            i32::from(color.r) << 8,
            i32::from(color.g) << 8,
            i32::from(color.b) << 8,
        ];
    }
    out
}
