//! Background scroller and parallax clouds

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::motion::{Motion, Pausable};
use crate::consts::SEAM_OVERLAP;
use crate::random_between;
use crate::tuning::{CloudTuning, SceneryTuning};

/// Two background panels leapfrogging each other
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scroller {
    /// Left edge x of each panel
    pub panels: [f32; 2],
    pub width: f32,
    pub motion: Motion,
}

impl Scroller {
    pub fn new(config: &SceneryTuning) -> Self {
        Self {
            panels: [0.0, config.panel_width],
            width: config.panel_width,
            motion: Motion::new(config.scroll_speed, false),
        }
    }

    pub fn tick(&mut self, dt: f32) {
        let dx = self.motion.step(dt);
        if dx == 0.0 {
            return;
        }
        for panel in &mut self.panels {
            *panel += dx;
        }
        for i in 0..2 {
            let other = self.panels[1 - i];
            if self.panels[i] < -self.width {
                self.panels[i] = other + self.width - SEAM_OVERLAP;
            } else if self.panels[i] > self.width {
                // Reversed travel wraps the other way
                self.panels[i] = other - self.width + SEAM_OVERLAP;
            }
        }
    }
}

impl Pausable for Scroller {
    fn set_paused(&mut self, paused: bool) {
        self.motion.set_paused(paused);
    }

    fn is_paused(&self) -> bool {
        self.motion.paused
    }
}

/// A drifting cloud
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cloud {
    pub id: u32,
    pub variant: usize,
    pub pos: Vec2,
}

/// Cloud spawner plus the clouds it owns.
///
/// Clouds never stop: they drift at base speed while the level is frozen and
/// speed up while it moves. Spawning stops for good once the run is over.
#[derive(Debug, Clone)]
pub struct CloudField {
    config: CloudTuning,
    pub clouds: Vec<Cloud>,
    timer: f32,
    current_speed: f32,
    stopped: bool,
    next_id: u32,
}

impl CloudField {
    pub fn new(config: CloudTuning, rng: &mut Pcg32) -> Self {
        let stopped = config.variants == 0;
        if stopped {
            log::error!("No cloud variants configured, cloud spawning disabled");
        }
        let timer = random_between(rng, config.min_delay, config.max_delay);
        let current_speed = config.base_speed;
        Self {
            config,
            clouds: Vec::new(),
            timer,
            current_speed,
            stopped,
            next_id: 1,
        }
    }

    /// Switch between base speed and the faster level-moving speed
    pub fn set_speed_boost(&mut self, boosted: bool) {
        self.current_speed = if boosted {
            self.config.base_speed * self.config.fast_multiplier
        } else {
            self.config.base_speed
        };
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn stop_spawning(&mut self) {
        self.stopped = true;
    }

    pub fn is_spawning(&self) -> bool {
        !self.stopped
    }

    /// Drift, cull and maybe spawn. Returns the id of a new cloud.
    pub fn tick(&mut self, dt: f32, rng: &mut Pcg32) -> Option<u32> {
        let dx = -self.current_speed * dt;
        let despawn_x = self.config.despawn_x;
        for cloud in &mut self.clouds {
            cloud.pos.x += dx;
        }
        self.clouds.retain(|c| c.pos.x >= despawn_x);

        if self.stopped {
            return None;
        }
        self.timer -= dt;
        if self.timer > 0.0 {
            return None;
        }
        self.timer = random_between(rng, self.config.min_delay, self.config.max_delay);

        let id = self.next_id;
        self.next_id += 1;
        let y = random_between(rng, self.config.min_y_offset, self.config.max_y_offset);
        self.clouds.push(Cloud {
            id,
            variant: rng.random_range(0..self.config.variants),
            pos: self.config.anchor + Vec2::new(self.config.x_offset, y),
        });
        Some(id)
    }
}
