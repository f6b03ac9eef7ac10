//! Registry of everything that scrolls with the level
//!
//! Actors register on spawn and unregister on removal. Pause broadcasts,
//! bounce reversals and spawn delays iterate this registry directly.

use rand_pcg::Pcg32;

use super::actor::{Actor, ActorFate};
use super::contact::LevelElements;
use super::motion::Pausable;
use super::scenery::{CloudField, Scroller};
use super::spawner::Spawner;
use crate::tuning::Tuning;

/// An actor removed from the level this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub id: u32,
    /// Lifetime ran out while on screen
    pub passed: bool,
}

#[derive(Debug, Clone)]
pub struct Scene {
    /// Live actors, ascending id
    actors: Vec<Actor>,
    pub spawner: Spawner,
    pub scroller: Scroller,
    pub clouds: CloudField,
    /// Last broadcast pause value
    paused: bool,
}

impl Scene {
    pub fn new(tuning: &Tuning, rng: &mut Pcg32) -> Self {
        Self {
            actors: Vec::new(),
            spawner: Spawner::new(tuning.spawner.clone(), rng),
            scroller: Scroller::new(&tuning.scenery),
            clouds: CloudField::new(tuning.clouds.clone(), rng),
            paused: false,
        }
    }

    pub fn register(&mut self, actor: Actor) {
        log::debug!("Registered actor {} ({:?})", actor.id, actor.kind);
        let at = self.actors.partition_point(|a| a.id < actor.id);
        self.actors.insert(at, actor);
    }

    pub fn unregister(&mut self, id: u32) -> Option<Actor> {
        let index = self.actors.iter().position(|a| a.id == id)?;
        Some(self.actors.remove(index))
    }

    pub fn actor(&self, id: u32) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn last_broadcast(&self) -> bool {
        self.paused
    }

    /// Visit every registered pausable element
    pub fn for_each_pausable(&mut self, mut f: impl FnMut(&mut dyn Pausable)) {
        for actor in &mut self.actors {
            f(actor);
        }
        f(&mut self.spawner);
        f(&mut self.scroller);
    }

    /// Move and age actors, removing those that expired or left the screen
    pub fn tick_actors(&mut self, dt: f32, removed: &mut Vec<Removal>) {
        let despawn_x = self.spawner.despawn_x();
        self.actors.retain_mut(|actor| match actor.tick(dt, despawn_x) {
            ActorFate::Alive => true,
            ActorFate::Expired => {
                removed.push(Removal {
                    id: actor.id,
                    passed: true,
                });
                false
            }
            ActorFate::Offscreen => {
                removed.push(Removal {
                    id: actor.id,
                    passed: false,
                });
                false
            }
        });
    }
}

impl LevelElements for Scene {
    fn broadcast_pause(&mut self, paused: bool) {
        self.paused = paused;
        self.for_each_pausable(|p| p.set_paused(paused));
        self.clouds.set_speed_boost(!paused);
    }

    fn reverse_motion(&mut self, duration: f32) {
        for actor in &mut self.actors {
            actor.motion.begin_reverse(duration);
        }
        self.scroller.motion.begin_reverse(duration);
    }

    fn delay_spawns(&mut self, seconds: f32) {
        self.spawner.add_delay(seconds);
    }
}
