//! Tick clock: owns the running tick count, speed control, and pause.
//!
//! The clock is how a driver turns "one more frame" into the
//! `(delta_ticks, total_ticks)` pair that `Engine::update` expects.

use crate::types::Tick;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickClock {
    pub total_ticks: Tick,
    /// Ticks per step at normal speed.
    pub step: Tick,
    pub speed: TickSpeed,
    pub paused: bool,
}

impl TickClock {
    pub fn new(step: Tick) -> Self {
        Self {
            total_ticks: 0,
            step,
            speed: TickSpeed::Normal,
            paused: false,
        }
    }

    /// Advance one step. Returns `(delta_ticks, total_ticks)`.
    /// A paused clock returns a zero delta and the unchanged total.
    pub fn advance(&mut self) -> (Tick, Tick) {
        if self.paused {
            return (0, self.total_ticks);
        }
        let delta = self.step * self.speed.multiplier();
        self.total_ticks += delta;
        (delta, self.total_ticks)
    }

    /// Back to tick zero, keeping step and speed.
    pub fn rewind(&mut self) {
        self.total_ticks = 0;
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn set_speed(&mut self, speed: TickSpeed) {
        self.speed = speed;
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(1)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TickSpeed {
    Normal,       // 1x step
    Fast,         // 2x step
    FastForward,  // 8x step
}

impl TickSpeed {
    pub fn multiplier(&self) -> Tick {
        match self {
            TickSpeed::Normal      => 1,
            TickSpeed::Fast        => 2,
            TickSpeed::FastForward => 8,
        }
    }
}
