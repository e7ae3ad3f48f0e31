//! Frame clock and coarse ticker

use crate::consts::{COARSE_TICK_SECS, NOMINAL_DT};

/// Turns monotonic millisecond timestamps into elapsed seconds
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Real seconds since the previous call, never negative. The first
    /// frame gets `NOMINAL_DT`. Long gaps (suspended tab) come through whole;
    /// the frame step caps its own delta.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        let elapsed = match self.last_ms {
            Some(last) => (now_ms - last) / 1000.0,
            None => NOMINAL_DT as f64,
        };
        self.last_ms = Some(now_ms);
        elapsed.max(0.0)
    }

    /// Forget the last timestamp so the next frame starts fresh
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Accumulates frame deltas into whole coarse ticks, for drivers without an
/// interval timer
#[derive(Debug, Clone, Default)]
pub struct CoarseTicker {
    accumulated: f32,
}

impl CoarseTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `dt` seconds; returns how many ticks are due
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulated += dt.max(0.0);
        let ticks = (self.accumulated / COARSE_TICK_SECS).floor();
        self.accumulated -= ticks * COARSE_TICK_SECS;
        ticks as u32
    }
}
