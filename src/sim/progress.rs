//! Pass-rate tracking that gates the safe object
//!
//! At the start of each countdown the level estimates how many obstacles
//! will appear before the storm hits. The safe object only shows up once the
//! player has outlived enough of them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressCounter {
    required_fraction: f32,
    total_spawned: u32,
    total_passed: u32,
    estimated_total: u32,
}

impl ProgressCounter {
    pub fn new(required_fraction: f32) -> Self {
        Self {
            required_fraction: required_fraction.clamp(0.0, 1.0),
            total_spawned: 0,
            total_passed: 0,
            estimated_total: 0,
        }
    }

    /// Expected spawn count for a countdown: ceil(duration / avg), at least 1
    pub fn estimate(countdown_duration: f32, avg_interval: f32) -> u32 {
        if countdown_duration <= 0.0 {
            return 0;
        }
        if avg_interval <= 0.0 {
            return 1;
        }
        ((countdown_duration / avg_interval).ceil() as u32).max(1)
    }

    /// Start a new epoch with a fresh estimate
    pub fn reset(&mut self, estimated_total: u32) {
        self.total_spawned = 0;
        self.total_passed = 0;
        self.estimated_total = estimated_total;
        log::debug!("Progress reset, estimated total {}", estimated_total);
    }

    pub fn record_spawn(&mut self) {
        self.total_spawned += 1;
    }

    pub fn record_pass(&mut self) {
        self.total_passed += 1;
    }

    /// Passed / estimated has reached the required fraction
    pub fn threshold_met(&self) -> bool {
        if self.estimated_total == 0 {
            return false;
        }
        self.total_passed as f32 / self.estimated_total as f32 >= self.required_fraction
    }

    pub fn total_spawned(&self) -> u32 {
        self.total_spawned
    }

    pub fn total_passed(&self) -> u32 {
        self.total_passed
    }

    pub fn estimated_total(&self) -> u32 {
        self.estimated_total
    }

    pub fn required_fraction(&self) -> f32 {
        self.required_fraction
    }
}
