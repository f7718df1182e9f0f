use std::cell::Cell;
use std::rc::Rc;

/// Monotonic reference clock driving the timekeeping of emulated devices.
///
/// Ticks are raw reference-clock cycles (typically the emulated CPU's time
/// stamp counter); devices that expose guest-visible counters scale them by
/// their own frequency ratio.
pub trait Clock {
    fn ticks(&self) -> u64;
}

/// Clock stuck at zero, for devices whose timekeeping is unused.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullClock;

impl Clock for NullClock {
    fn ticks(&self) -> u64 {
        0
    }
}

/// Deterministic, explicitly advanced clock.
///
/// Cloned handles share the same counter, so a test can hold one handle and
/// hand another to the device under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ticks: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ticks: u64) {
        self.ticks.set(self.ticks.get().wrapping_add(ticks));
    }

    pub fn set(&self, ticks: u64) {
        self.ticks.set(ticks);
    }
}

impl Clock for ManualClock {
    fn ticks(&self) -> u64 {
        self.ticks.get()
    }
}
