//! Obstacle spawner
//!
//! Spawns from a fixed anchor with random vertical jitter on a randomized
//! interval. Spawned objects inherit the spawner's pause flag, so anything
//! created while the level is frozen starts frozen.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::ActorKind;
use super::motion::Pausable;
use super::progress::ProgressCounter;
use crate::error::ConfigError;
use crate::random_between;
use crate::tuning::SpawnerTuning;

/// Everything needed to create an actor; the level assigns the id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    pub kind: ActorKind,
    pub prefab: String,
    pub pos: Vec2,
    pub speed: f32,
    pub lifetime: Option<f32>,
    pub paused: bool,
}

#[derive(Debug, Clone)]
pub struct Spawner {
    config: SpawnerTuning,
    /// Seconds until the next ordinary spawn
    timer: f32,
    paused: bool,
    halted: bool,
    safe_spawned: bool,
    disabled: bool,
}

impl Spawner {
    pub fn new(config: SpawnerTuning, rng: &mut Pcg32) -> Self {
        let disabled = config.prefabs.is_empty();
        if disabled {
            log::error!("Spawner: {}, ordinary spawning disabled", ConfigError::MissingPrefabs);
        }
        let timer = random_between(rng, config.min_interval, config.max_interval);
        Self {
            config,
            timer,
            paused: false,
            halted: false,
            safe_spawned: false,
            disabled,
        }
    }

    /// Count down and emit an obstacle when the interval runs out
    pub fn tick(
        &mut self,
        dt: f32,
        rng: &mut Pcg32,
        progress: &mut ProgressCounter,
    ) -> Option<Spawn> {
        if self.disabled || self.halted || self.paused {
            return None;
        }

        self.timer -= dt;
        if self.timer > 0.0 {
            return None;
        }

        self.timer = self.draw_interval(rng);
        let spawn = self.ordinary_spawn(rng);
        progress.record_spawn();
        log::debug!(
            "Spawned {} at ({:.2}, {:.2}), next in {:.2}s",
            spawn.prefab,
            spawn.pos.x,
            spawn.pos.y,
            self.timer
        );
        Some(spawn)
    }

    fn ordinary_spawn(&self, rng: &mut Pcg32) -> Spawn {
        let prefab = &self.config.prefabs[rng.random_range(0..self.config.prefabs.len())];
        let range = self.config.height_range;
        let jitter = random_between(rng, -range, range);
        Spawn {
            kind: ActorKind::Obstacle,
            prefab: prefab.clone(),
            pos: self.config.anchor + Vec2::new(0.0, jitter),
            speed: self.config.object_speed,
            lifetime: Some(self.config.lifetime),
            paused: self.paused,
        }
    }

    fn draw_interval(&self, rng: &mut Pcg32) -> f32 {
        random_between(rng, self.config.min_interval, self.config.max_interval)
    }

    /// Spawn the safe object once per epoch; later calls do nothing
    pub fn spawn_safe_object(&mut self) -> Option<Spawn> {
        if self.safe_spawned {
            log::warn!("Safe object already spawned this epoch, ignoring");
            return None;
        }
        let Some(prefab) = self.config.safe_prefab.clone() else {
            log::error!("Spawner: no safe prefab configured, cannot spawn safe object");
            return None;
        };
        self.safe_spawned = true;
        log::info!("Safe object spawned");
        Some(Spawn {
            kind: ActorKind::SafeObject,
            prefab,
            pos: self.config.anchor + Vec2::new(0.0, self.config.safe_y_offset),
            speed: self.config.object_speed,
            lifetime: None,
            paused: self.paused,
        })
    }

    /// Push the next spawn back (never below zero)
    pub fn add_delay(&mut self, seconds: f32) {
        self.timer = (self.timer + seconds).max(0.0);
    }

    /// Fresh interval, clear the safe-object and halt flags
    pub fn reset(&mut self, rng: &mut Pcg32) {
        self.timer = self.draw_interval(rng);
        self.safe_spawned = false;
        self.halted = false;
    }

    pub fn set_halted(&mut self, halted: bool) {
        if halted != self.halted {
            log::info!("Ordinary spawning {}", if halted { "halted" } else { "resumed" });
        }
        self.halted = halted;
    }

    /// Mean of the interval range, used to estimate an epoch's spawn count
    pub fn avg_interval(&self) -> f32 {
        (self.config.min_interval + self.config.max_interval) / 2.0
    }

    pub fn time_until_spawn(&self) -> f32 {
        self.timer
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn safe_spawned(&self) -> bool {
        self.safe_spawned
    }

    pub fn despawn_x(&self) -> f32 {
        self.config.despawn_x
    }
}

impl Pausable for Spawner {
    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
