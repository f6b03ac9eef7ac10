//! Leftward scrolling motion shared by obstacles and the background
//!
//! Everything in the level moves toward negative x at its own speed. A
//! pause freezes it; a bounce reverses it for a short window and wins over
//! the pause while it lasts.

use serde::{Deserialize, Serialize};

/// Anything the player controller can freeze
pub trait Pausable {
    fn set_paused(&mut self, paused: bool);
    fn is_paused(&self) -> bool;
}

/// Signed horizontal motion with pause and temporary reverse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Leftward speed (world units per second)
    pub speed: f32,
    pub paused: bool,
    /// Seconds of reversed travel still owed (0 = none)
    pub reverse_remaining: f32,
}

impl Motion {
    pub fn new(speed: f32, paused: bool) -> Self {
        Self {
            speed,
            paused,
            reverse_remaining: 0.0,
        }
    }

    /// Horizontal displacement for this tick
    pub fn step(&mut self, dt: f32) -> f32 {
        if self.reverse_remaining > 0.0 {
            self.reverse_remaining = (self.reverse_remaining - dt).max(0.0);
            return self.speed * dt;
        }
        if self.paused { 0.0 } else { -self.speed * dt }
    }

    /// Start a reverse window, replacing any window already running
    pub fn begin_reverse(&mut self, duration: f32) {
        self.reverse_remaining = duration.max(0.0);
    }

    #[inline]
    pub fn is_reversing(&self) -> bool {
        self.reverse_remaining > 0.0
    }

    /// Direction of travel on the next step: -1 forward, 0 frozen, 1 reversed
    pub fn direction(&self) -> f32 {
        if self.is_reversing() {
            1.0
        } else if self.paused {
            0.0
        } else {
            -1.0
        }
    }
}

impl Pausable for Motion {
    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
