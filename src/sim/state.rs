//! Game state and the events it reports
//!
//! `GameState` owns every collaborator. Components get what they need passed
//! in per call, so there is no hidden shared state.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorKind};
use super::contact::{JumpImpulse, PlayerController};
use super::hazard::{HazardEvent, HazardSequencer};
use super::progress::ProgressCounter;
use super::scene::Scene;
use super::strike::StrikeEvent;
use crate::audio::SoundEffect;
use crate::highscores::ScoreBoard;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Menu open, simulation frozen
    Menu,
    /// Player reached the safe zone
    Won,
    /// Run ended
    GameOver,
}

/// Everything the renderer, HUD and audio need to hear about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PauseChanged(bool),
    ActorSpawned { id: u32, kind: ActorKind },
    ActorRemoved { id: u32, passed: bool },
    CloudSpawned { id: u32 },
    ScoreChanged { score: u32, high_score: u32 },
    CountdownStarted { duration: f32 },
    TimeRemaining(f32),
    Jumped(JumpImpulse),
    Strike(StrikeEvent),
    PlayerBurnt,
    Sound(SoundEffect),
    /// Effect played at a tuned volume scale instead of its default
    ScaledSound { effect: SoundEffect, scale: f32 },
    HaltSpawns,
    Won,
    GameOver,
}

/// Complete game state (deterministic for a given seed and input)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: PlayerController,
    pub scene: Scene,
    pub progress: ProgressCounter,
    pub hazard: HazardSequencer,
    pub scores: ScoreBoard,
    events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, tuning: Tuning, high_score: u32) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let scene = Scene::new(&tuning, &mut rng);
        Self {
            seed,
            player: PlayerController::new(tuning.player.clone()),
            progress: ProgressCounter::new(tuning.hazard.required_pass_fraction),
            hazard: HazardSequencer::new(tuning.hazard.clone(), tuning.strike.clone()),
            scene,
            rng,
            tuning,
            phase: GamePhase::Playing,
            time_ticks: 0,
            scores: ScoreBoard::new(high_score),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::Won | GamePhase::GameOver)
    }

    /// Create an actor from a spawn and register it
    pub(crate) fn spawn_actor(&mut self, spawn: super::spawner::Spawn) -> u32 {
        let id = self.next_entity_id();
        let kind = spawn.kind;
        self.scene.register(Actor::from_spawn(id, spawn));
        self.push_event(GameEvent::ActorSpawned { id, kind });
        id
    }

    /// Translate sequencer output into level changes and events
    pub(crate) fn apply_hazard_events(&mut self, hazard_events: Vec<HazardEvent>) {
        for event in hazard_events {
            match event {
                HazardEvent::CountdownStarted { duration } => {
                    self.push_event(GameEvent::CountdownStarted { duration });
                }
                HazardEvent::TimeRemaining(seconds) => {
                    self.push_event(GameEvent::TimeRemaining(seconds));
                }
                HazardEvent::HaltSpawns => {
                    self.scene.spawner.set_halted(true);
                    self.push_event(GameEvent::HaltSpawns);
                }
                HazardEvent::SpawnSafeObject | HazardEvent::Burnt if self.is_over() => {
                    log::debug!("Ignoring {:?} after the run ended", event);
                }
                HazardEvent::SpawnSafeObject => {
                    if let Some(spawn) = self.scene.spawner.spawn_safe_object() {
                        self.spawn_actor(spawn);
                    }
                }
                HazardEvent::Strike(strike) => {
                    if matches!(strike, StrikeEvent::Started { .. }) {
                        self.push_event(GameEvent::ScaledSound {
                            effect: SoundEffect::Thunder,
                            scale: self.tuning.strike.thunder_volume,
                        });
                    }
                    self.push_event(GameEvent::Strike(strike));
                }
                HazardEvent::Burnt => self.push_event(GameEvent::PlayerBurnt),
                HazardEvent::Resolved(super::hazard::Outcome::Win) => {
                    self.finish(GamePhase::Won);
                }
                HazardEvent::Resolved(super::hazard::Outcome::Lose) => {
                    self.finish(GamePhase::GameOver);
                }
            }
        }
    }

    /// End the run. The first outcome sticks.
    pub(crate) fn finish(&mut self, phase: GamePhase) {
        if self.is_over() {
            return;
        }
        log::info!("Run finished: {:?} with score {}", phase, self.scores.score);
        self.phase = phase;
        self.scene.clouds.stop_spawning();
        self.scene.spawner.set_halted(true);
        match phase {
            GamePhase::Won => self.push_event(GameEvent::Won),
            _ => {
                self.push_event(GameEvent::GameOver);
                self.push_event(GameEvent::Sound(SoundEffect::GameOver));
            }
        }
    }

    /// Cancel the storm and start a new countdown epoch in the same level
    pub fn reset_epoch(&mut self) {
        let mut hazard_events = Vec::new();
        self.hazard.reset_epoch(&mut self.progress, &mut hazard_events);
        self.scene.spawner.reset(&mut self.rng);
        self.apply_hazard_events(hazard_events);
    }

    /// Rebuild the level from scratch, keeping the high score
    pub fn restart(&mut self) {
        log::info!("Restarting run");
        let high_score = self.scores.high_score;
        let seed = self.seed.wrapping_add(1);
        *self = Self::new(seed, self.tuning.clone(), high_score);
        let scores = self.scores;
        self.push_event(GameEvent::ScoreChanged {
            score: scores.score,
            high_score: scores.high_score,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = GameState::new(1, Tuning::default(), 12);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.scores.high_score, 12);
        assert!(state.scene.actors().is_empty());
        assert!(!state.player.is_paused());
    }

    #[test]
    fn test_finish_latches_first_outcome() {
        let mut state = GameState::new(1, Tuning::default(), 0);
        state.finish(GamePhase::Won);
        state.finish(GamePhase::GameOver);
        assert_eq!(state.phase, GamePhase::Won);
        assert!(!state.scene.clouds.is_spawning());
        let events = state.drain_events();
        assert_eq!(events, vec![GameEvent::Won]);
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_restart_keeps_high_score() {
        let mut state = GameState::new(1, Tuning::default(), 0);
        for _ in 0..3 {
            state.scores.increment();
        }
        state.finish(GamePhase::GameOver);
        state.restart();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.scores.score, 0);
        assert_eq!(state.scores.high_score, 3);
        assert_eq!(state.seed, 2);
    }

    #[test]
    fn test_safe_object_spawns_once() {
        let mut state = GameState::new(1, Tuning::default(), 0);
        state.apply_hazard_events(vec![HazardEvent::SpawnSafeObject, HazardEvent::SpawnSafeObject]);
        let safe = state
            .scene
            .actors()
            .iter()
            .filter(|a| a.kind == ActorKind::SafeObject)
            .count();
        assert_eq!(safe, 1);
    }

    #[test]
    fn test_finished_run_ignores_safe_object_and_burn() {
        let mut state = GameState::new(1, Tuning::default(), 0);
        state.finish(GamePhase::GameOver);
        state.drain_events();
        state.apply_hazard_events(vec![HazardEvent::SpawnSafeObject, HazardEvent::Burnt]);
        assert!(state.scene.actors().is_empty());
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_thunder_uses_tuned_volume() {
        let mut tuning = Tuning::default();
        tuning.strike.thunder_volume = 0.5;
        let mut state = GameState::new(1, tuning, 0);
        state.apply_hazard_events(vec![HazardEvent::Strike(StrikeEvent::Started {
            bolt: crate::sim::strike::Bolt::Ambient,
            anchor: glam::Vec2::ZERO,
        })]);
        assert!(state.events().contains(&GameEvent::ScaledSound {
            effect: SoundEffect::Thunder,
            scale: 0.5,
        }));
    }
}
