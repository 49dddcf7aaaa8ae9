//! Fixed-rate tick pacing

use crate::host::Clock;
use std::time::Duration;

/// Overrun banked at most, in whole ticks
const MAX_DEBT_TICKS: u32 = 10;

/// Paces the tick loop to a fixed period.
///
/// Each call to [`TickPacer::pace`] sleeps away whatever is left of the
/// current period. A tick that overruns banks the overrun as debt, which
/// shortens later sleeps until it is repaid.
#[derive(Debug, Clone)]
pub struct TickPacer {
    period: Duration,
    debt: Duration,
    tick_started: Option<Duration>,
}

impl TickPacer {
    pub fn new(tick_hz: u32) -> Self {
        Self {
            period: Duration::from_secs(1) / tick_hz.max(1),
            debt: Duration::ZERO,
            tick_started: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Overrun not yet repaid
    pub fn debt(&self) -> Duration {
        self.debt
    }

    /// Close the current tick. Returns how long it slept.
    pub fn pace(&mut self, clock: &mut dyn Clock) -> Duration {
        let Some(started) = self.tick_started else {
            self.tick_started = Some(clock.now());
            return Duration::ZERO;
        };
        let elapsed = clock.now().saturating_sub(started);

        let mut sleep = Duration::ZERO;
        if elapsed < self.period {
            let remaining = self.period - elapsed;
            if remaining > self.debt {
                sleep = remaining - self.debt;
                self.debt = Duration::ZERO;
            } else {
                self.debt -= remaining;
            }
            if !sleep.is_zero() {
                clock.sleep(sleep);
            }
        } else {
            self.debt = (self.debt + (elapsed - self.period)).min(self.period * MAX_DEBT_TICKS);
        }

        self.tick_started = Some(clock.now());
        sleep
    }
}
