//! Artificial work delays
//!
//! Every stage pauses a little so the progress monitor has something to
//! show. Delays are expressed in ticks; one tick is 100 ms by default.

use std::thread;
use std::time::Duration;

/// Default tick length
pub const DEFAULT_TICK_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    tick: Duration,
}

impl Pacing {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }

    /// No delays at all
    pub fn none() -> Self {
        Self { tick: Duration::ZERO }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Block for `ticks` ticks
    pub fn pause(&self, ticks: u32) {
        if self.tick.is_zero() || ticks == 0 {
            return;
        }
        thread::sleep(self.tick * ticks);
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TICK_MS))
    }
}
