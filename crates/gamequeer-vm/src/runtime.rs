//! The tick loop
//!
//! Each step runs the fixed per-tick sequence: scheduler tick, input poll,
//! event dispatch, LED output, save commit, then pacing.

use crate::engine::Engine;
use crate::host::{Clock, InputSource, LedSink, Surface};
use crate::timing::TickPacer;
use tracing::{debug, info};

/// State of the loop after one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Running,
    /// Content requested an unload; the loop must stop
    Unloaded,
}

/// Totals of a finished [`Runtime::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub unloaded: bool,
    /// Ticks after which the save region had changed
    pub save_commits: u64,
}

pub struct Runtime<S, I, L, C> {
    engine: Engine,
    surface: S,
    input: I,
    leds: L,
    clock: C,
    pacer: Option<TickPacer>,
    save_commits: u64,
}

impl<S, I, L, C> Runtime<S, I, L, C>
where
    S: Surface,
    I: InputSource,
    L: LedSink,
    C: Clock,
{
    /// Wrap an engine that already has a game loaded. Ticks run back to
    /// back until [`Runtime::paced`] turns pacing on.
    pub fn new(engine: Engine, surface: S, input: I, leds: L, clock: C) -> Self {
        Self {
            engine,
            surface,
            input,
            leds,
            clock,
            pacer: None,
            save_commits: 0,
        }
    }

    /// Pace ticks to the configured tick rate
    pub fn paced(mut self) -> Self {
        self.pacer = Some(TickPacer::new(self.engine.config().tick_hz));
        self
    }

    pub fn step(&mut self) -> StepOutcome {
        self.engine.tick();

        let buttons = self.input.poll();
        for button in buttons.iter() {
            self.engine.raise(button.event());
        }

        self.engine.handle_events(&mut self.surface);

        if let Some(colors) = self.engine.take_led_update() {
            self.leds.show(&colors);
        }
        if self.engine.commit_save() {
            self.save_commits += 1;
        }

        if let Some(pacer) = self.pacer.as_mut() {
            pacer.pace(&mut self.clock);
        }

        if self.engine.is_unload_requested() {
            StepOutcome::Unloaded
        } else {
            StepOutcome::Running
        }
    }

    /// Step until `limit` ticks have run (forever when `None`) or content
    /// requests an unload
    pub fn run(&mut self, limit: Option<u64>) -> RunSummary {
        let mut ticks = 0;
        let mut unloaded = false;
        while limit.map_or(true, |limit| ticks < limit) {
            ticks += 1;
            if self.step() == StepOutcome::Unloaded {
                unloaded = true;
                info!(ticks, "cartridge unloaded");
                break;
            }
        }
        debug!(ticks, save_commits = self.save_commits, "tick loop stopped");
        RunSummary {
            ticks,
            unloaded,
            save_commits: self.save_commits,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn led_sink(&self) -> &L {
        &self.leds
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_engine(self) -> Engine {
        self.engine
    }
}
