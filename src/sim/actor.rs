//! Spawned level objects: obstacles and the safe object
//!
//! An actor moves with the level and usually carries a lifetime. When the
//! lifetime runs out the obstacle counts as passed; being culled off-screen
//! does not.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::motion::{Motion, Pausable};
use super::spawner::Spawn;

/// What an actor is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorKind {
    /// Ordinary obstacle from the spawner
    Obstacle,
    /// The one-off object that carries the safe zone
    SafeObject,
}

/// Relative slack on expiry so a lifetime that is a whole number of ticks
/// expires on that tick despite rounding in the step size
const EXPIRY_TOLERANCE: f64 = 1e-6;

/// Self-destruct countdown
///
/// Elapsed time is summed in `f64`; summing `f32` steps drifts by more than
/// a tick over long lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lifetime {
    pub seconds: f32,
    pub elapsed: f64,
    pub paused: bool,
}

impl Lifetime {
    pub fn new(seconds: f32, paused: bool) -> Self {
        Self {
            seconds,
            elapsed: 0.0,
            paused,
        }
    }

    /// Advance the countdown, returns true once it has run out
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.paused {
            self.elapsed += f64::from(dt);
        }
        let seconds = f64::from(self.seconds);
        self.elapsed >= seconds - EXPIRY_TOLERANCE * seconds.max(1.0)
    }
}

/// Why an actor left the level this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorFate {
    Alive,
    /// Lifetime ran out naturally
    Expired,
    /// Scrolled past the despawn line
    Offscreen,
}

/// A live level object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: u32,
    pub kind: ActorKind,
    pub prefab: String,
    pub pos: Vec2,
    pub motion: Motion,
    pub lifetime: Option<Lifetime>,
}

impl Actor {
    pub fn from_spawn(id: u32, spawn: Spawn) -> Self {
        Self {
            id,
            kind: spawn.kind,
            prefab: spawn.prefab,
            pos: spawn.pos,
            motion: Motion::new(spawn.speed, spawn.paused),
            lifetime: spawn.lifetime.map(|l| Lifetime::new(l, spawn.paused)),
        }
    }

    /// Move and age the actor by one tick
    pub fn tick(&mut self, dt: f32, despawn_x: f32) -> ActorFate {
        self.pos.x += self.motion.step(dt);

        if let Some(lifetime) = &mut self.lifetime {
            if lifetime.tick(dt) {
                return ActorFate::Expired;
            }
        }

        if self.pos.x < despawn_x {
            ActorFate::Offscreen
        } else {
            ActorFate::Alive
        }
    }
}

impl Pausable for Actor {
    fn set_paused(&mut self, paused: bool) {
        self.motion.set_paused(paused);
        if let Some(lifetime) = &mut self.lifetime {
            lifetime.paused = paused;
        }
    }

    fn is_paused(&self) -> bool {
        self.motion.paused
    }
}
