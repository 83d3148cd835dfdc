//! Tick countdowns
//!
//! Every wait in the simulation (animations, invincibility, transitions) is a
//! countdown advanced once per tick.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Countdown {
    remaining: u32,
    total: u32,
}

impl Countdown {
    pub fn new(ticks: u32) -> Self {
        Self {
            remaining: ticks,
            total: ticks,
        }
    }

    /// Advance one tick. Returns true exactly once, on the tick the
    /// countdown reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[inline]
    pub fn elapsed(&self) -> u32 {
        self.total - self.remaining
    }

    /// Fraction of the countdown still to run (1.0 when fresh, 0.0 when done)
    pub fn fraction_remaining(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.remaining as f32 / self.total as f32
        }
    }

    /// Fraction elapsed (0.0 when fresh, 1.0 when done)
    pub fn progress(&self) -> f32 {
        1.0 - self.fraction_remaining()
    }
}
