//! Fixed timestep simulation tick
//!
//! Contacts are resolved before anything moves, so a pause or unpause takes
//! effect on the same tick it was triggered.

use super::contact::{ContactCategory, ContactEvent, ContactOutcome, ContactPhase, SceneQuery};
use super::hazard::{HazardContext, HazardPhase};
use super::scene::Removal;
use super::state::{GameEvent, GamePhase, GameState};
use crate::audio::SoundEffect;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump (click/tap/space)
    pub jump: bool,
    /// Menu toggle
    pub menu_pause: bool,
    /// Contacts reported by the host since the last tick, in order
    pub contacts: Vec<ContactEvent>,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, query: &dyn SceneQuery, dt: f32) {
    if input.menu_pause {
        match state.phase {
            GamePhase::Playing => {
                log::info!("Menu opened");
                state.phase = GamePhase::Menu;
                return;
            }
            GamePhase::Menu => {
                log::info!("Menu closed");
                state.phase = GamePhase::Playing;
            }
            _ => {}
        }
    }

    if state.phase == GamePhase::Menu {
        return;
    }

    state.time_ticks += 1;

    if state.phase == GamePhase::Playing {
        let mut was_paused = state.player.is_paused();

        for contact in &input.contacts {
            handle_contact(state, contact, query);
            sync_pause(state, &mut was_paused);
            if state.is_over() {
                break;
            }
        }

        if input.jump && !state.is_over() {
            let impulse = state.player.jump(&mut state.scene);
            state.push_event(GameEvent::Jumped(impulse));
            state.push_event(GameEvent::Sound(SoundEffect::Jump));
            sync_pause(state, &mut was_paused);
        }

        if !state.is_over() {
            state.player.tick(dt, &mut state.scene);
            sync_pause(state, &mut was_paused);
            integrate_level(state, dt);
        }
    }

    if state.phase == GamePhase::GameOver {
        return;
    }

    if let Some(id) = state.scene.clouds.tick(dt, &mut state.rng) {
        state.push_event(GameEvent::CloudSpawned { id });
    }

    // After a win only the safe-zone strike is left to play out
    if state.is_over() && state.hazard.phase() != HazardPhase::SafeZoneReached {
        return;
    }

    let mut hazard_events = Vec::new();
    let ctx = HazardContext {
        progress: &mut state.progress,
        avg_spawn_interval: state.scene.spawner.avg_interval(),
        player_pos: query.player_bounds().center(),
    };
    state.hazard.tick(dt, ctx, &mut state.rng, &mut hazard_events);
    state.apply_hazard_events(hazard_events);
}

fn sync_pause(state: &mut GameState, was_paused: &mut bool) {
    let paused = state.player.is_paused();
    if paused != *was_paused {
        *was_paused = paused;
        state.push_event(GameEvent::PauseChanged(paused));
    }
}

fn handle_contact(state: &mut GameState, contact: &ContactEvent, query: &dyn SceneQuery) {
    if contact.phase == ContactPhase::Enter
        && contact.category == ContactCategory::Obstacle
        && !contact.is_ground
    {
        state.push_event(GameEvent::Sound(SoundEffect::Collision));
    }

    match state.player.handle_contact(contact, query, &mut state.scene) {
        ContactOutcome::None | ContactOutcome::Bounced => {}
        ContactOutcome::Fatal => {
            state.push_event(GameEvent::Sound(SoundEffect::DangerousHit));
            state.finish(GamePhase::GameOver);
        }
        ContactOutcome::SafeZoneReached { at } => {
            let mut hazard_events = Vec::new();
            state
                .hazard
                .enter_safe_zone(at, &mut state.rng, &mut hazard_events);
            state.apply_hazard_events(hazard_events);
        }
        ContactOutcome::Scored { object } => {
            let new_best = state.scores.increment();
            if new_best {
                log::debug!("New high score {}", state.scores.high_score);
            }
            let scores = state.scores;
            state.push_event(GameEvent::ScoreChanged {
                score: scores.score,
                high_score: scores.high_score,
            });
            if state.scene.unregister(object).is_some() {
                state.push_event(GameEvent::ActorRemoved {
                    id: object,
                    passed: false,
                });
            }
        }
    }
}

/// Move actors, spawn, scroll the background
fn integrate_level(state: &mut GameState, dt: f32) {
    let mut removed = Vec::new();
    state.scene.tick_actors(dt, &mut removed);
    for Removal { id, passed } in removed {
        if passed {
            state.progress.record_pass();
        }
        state.push_event(GameEvent::ActorRemoved { id, passed });
    }

    if let Some(spawn) = state
        .scene
        .spawner
        .tick(dt, &mut state.rng, &mut state.progress)
    {
        state.spawn_actor(spawn);
    }

    state.scene.scroller.tick(dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::actor::ActorKind;
    use crate::sim::bounds::Bounds;
    use crate::sim::contact::LevelElements;
    use crate::sim::motion::Pausable;
    use crate::sim::spawner::Spawn;
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;
    use std::collections::HashMap;

    use ContactCategory::*;

    struct Stage {
        player: Bounds,
        objects: HashMap<u32, Bounds>,
    }

    impl Stage {
        fn new() -> Self {
            Self {
                player: Bounds::from_center(Vec2::ZERO, Vec2::splat(0.5)),
                objects: HashMap::new(),
            }
        }
    }

    impl SceneQuery for Stage {
        fn player_bounds(&self) -> Bounds {
            self.player
        }
        fn bounds_of(&self, object: u32) -> Option<Bounds> {
            self.objects.get(&object).copied()
        }
        fn obstacle_ahead(&self, _origin: Vec2, _distance: f32) -> bool {
            false
        }
    }

    fn quick_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.hazard.initial_strike_delay = 0.25;
        tuning.hazard.min_countdown = 0.5;
        tuning.hazard.max_countdown = 0.5;
        tuning.strike.min_flicker = 1;
        tuning.strike.max_flicker = 1;
        tuning.strike.flicker_on = 0.0625;
        tuning
    }

    fn contacts(events: Vec<ContactEvent>) -> TickInput {
        TickInput {
            contacts: events,
            ..Default::default()
        }
    }

    fn obstacle_spawn() -> Spawn {
        Spawn {
            kind: ActorKind::Obstacle,
            prefab: "Pipe".into(),
            pos: Vec2::new(3.0, 0.0),
            speed: 1.0,
            lifetime: Some(10.0),
            paused: false,
        }
    }

    #[test]
    fn test_menu_freezes_simulation() {
        let stage = Stage::new();
        let mut state = GameState::new(1, Tuning::default(), 0);
        let toggle = TickInput {
            menu_pause: true,
            ..Default::default()
        };
        tick(&mut state, &toggle, &stage, 0.25);
        assert_eq!(state.phase, GamePhase::Menu);
        let before = state.scene.scroller.panels;
        tick(&mut state, &TickInput::default(), &stage, 0.25);
        assert_eq!(state.scene.scroller.panels, before);
        assert_eq!(state.time_ticks, 0);

        tick(&mut state, &toggle, &stage, 0.25);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_contact_pause_applies_before_motion() {
        let stage = Stage::new();
        let mut state = GameState::new(1, Tuning::default(), 0);
        let id = state.spawn_actor(obstacle_spawn());

        tick(
            &mut state,
            &contacts(vec![ContactEvent::enter(Obstacle, 50)]),
            &stage,
            0.25,
        );
        assert!(state.player.is_paused());
        assert_eq!(state.scene.actor(id).map(|a| a.pos.x), Some(3.0));
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::PauseChanged(true)));
        assert!(events.contains(&GameEvent::Sound(SoundEffect::Collision)));

        tick(
            &mut state,
            &contacts(vec![ContactEvent::enter(Proceed, 51)]),
            &stage,
            0.25,
        );
        assert_eq!(state.scene.actor(id).map(|a| a.pos.x), Some(2.75));
    }

    #[test]
    fn test_safe_zone_beats_expiry_in_same_tick() {
        let mut stage = Stage::new();
        stage
            .objects
            .insert(99, Bounds::from_center(Vec2::new(1.0, 0.0), Vec2::ONE));
        let mut state = GameState::new(3, quick_tuning(), 0);

        for _ in 0..20 {
            if state.hazard.phase() == HazardPhase::CountdownRunning
                && state.hazard.time_remaining() <= 0.25
            {
                break;
            }
            tick(&mut state, &TickInput::default(), &stage, 0.25);
        }
        assert_eq!(state.hazard.time_remaining(), 0.25);

        tick(
            &mut state,
            &contacts(vec![ContactEvent::enter(SafeZone, 99)]),
            &stage,
            0.25,
        );
        assert_eq!(state.phase, GamePhase::Won);

        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), &stage, 0.25);
        }
        assert_eq!(state.phase, GamePhase::Won);
        assert!(!state.drain_events().contains(&GameEvent::PlayerBurnt));
    }

    #[test]
    fn test_countdown_expiry_ends_run() {
        let stage = Stage::new();
        let mut state = GameState::new(4, quick_tuning(), 0);
        for _ in 0..40 {
            tick(&mut state, &TickInput::default(), &stage, 0.25);
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::PlayerBurnt));
        assert!(events.contains(&GameEvent::GameOver));
        assert!(!state.scene.clouds.is_spawning());
    }

    #[test]
    fn test_dangerous_contact_is_game_over() {
        let stage = Stage::new();
        let mut state = GameState::new(1, Tuning::default(), 0);
        tick(
            &mut state,
            &contacts(vec![
                ContactEvent::enter(DangerousObstacle, 5),
                ContactEvent::enter(SafeZone, 6),
            ]),
            &stage,
            SIM_DT,
        );
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_storm_freezes_after_fatal_contact() {
        let stage = Stage::new();
        let mut state = GameState::new(4, quick_tuning(), 0);
        tick(
            &mut state,
            &contacts(vec![ContactEvent::enter(DangerousObstacle, 5)]),
            &stage,
            0.125,
        );
        assert_eq!(state.phase, GamePhase::GameOver);
        state.drain_events();

        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), &stage, 0.125);
        }
        let events = state.drain_events();
        assert!(!events.contains(&GameEvent::PlayerBurnt));
        assert!(!events.iter().any(|e| matches!(
            e,
            GameEvent::Strike(_) | GameEvent::ScaledSound { .. } | GameEvent::ActorSpawned { .. }
        )));
        assert_eq!(state.hazard.phase(), HazardPhase::InitialDelay);
        assert!(state.scene.actors().is_empty());
    }

    #[test]
    fn test_score_contact_increments_and_removes() {
        let stage = Stage::new();
        let mut state = GameState::new(1, Tuning::default(), 1);
        let id = state.spawn_actor(obstacle_spawn());
        tick(&mut state, &contacts(vec![ContactEvent::enter(Score, id)]), &stage, SIM_DT);
        tick(&mut state, &contacts(vec![ContactEvent::enter(Score, 77)]), &stage, SIM_DT);
        assert_eq!(state.scores.score, 2);
        assert_eq!(state.scores.high_score, 2);
        assert!(state.scene.actor(id).is_none());
    }

    #[test]
    fn test_bounce_reverses_three_actors() {
        let stage = Stage::new();
        let mut state = GameState::new(1, Tuning::default(), 0);
        state.scene.spawner.set_halted(true);
        let ids: Vec<u32> = (0..3).map(|_| state.spawn_actor(obstacle_spawn())).collect();

        let positions = |state: &GameState| -> Vec<f32> {
            ids.iter()
                .filter_map(|&id| state.scene.actor(id).map(|a| a.pos.x))
                .collect()
        };

        let mut input = contacts(vec![ContactEvent::enter(LeftBounceCollider, 40)]);
        for _ in 0..4 {
            let before = positions(&state);
            tick(&mut state, &input, &stage, 0.0625);
            input = TickInput::default();
            let after = positions(&state);
            assert_eq!(after.len(), 3);
            assert!(before.iter().zip(&after).all(|(b, a)| a > b));
        }
        assert!(!state.player.is_paused());

        let before = positions(&state);
        tick(&mut state, &TickInput::default(), &stage, 0.0625);
        let after = positions(&state);
        assert!(before.iter().zip(&after).all(|(b, a)| a < b));
        assert!(state.scene.actors().iter().all(|a| !a.is_paused()));
    }

    #[test]
    fn test_expired_actor_records_one_pass() {
        let stage = Stage::new();
        let mut state = GameState::new(1, Tuning::default(), 0);
        state.scene.spawner.set_halted(true);
        state.spawn_actor(Spawn {
            lifetime: Some(0.5),
            ..obstacle_spawn()
        });
        for _ in 0..8 {
            tick(&mut state, &TickInput::default(), &stage, 0.125);
        }
        assert_eq!(state.progress.total_passed(), 1);
    }

    #[test]
    fn test_jump_reports_impulse() {
        let stage = Stage::new();
        let mut state = GameState::new(1, Tuning::default(), 0);
        let input = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &input, &stage, SIM_DT);
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::Jumped(j) if j.impulse == 5.0))
        );
    }

    #[test]
    fn test_reset_epoch_restarts_countdown() {
        let stage = Stage::new();
        let mut state = GameState::new(5, Tuning::default(), 0);
        for _ in 0..(10 * 120) {
            tick(&mut state, &TickInput::default(), &stage, SIM_DT);
        }
        assert_ne!(state.hazard.phase(), HazardPhase::InitialDelay);

        state.reset_epoch();
        assert_eq!(state.hazard.phase(), HazardPhase::InitialDelay);
        assert_eq!(state.progress.total_spawned(), 0);
        assert_eq!(state.progress.total_passed(), 0);
        assert!(!state.scene.spawner.is_halted());
    }

    #[test]
    fn test_determinism() {
        let stage = Stage::new();
        let mut state1 = GameState::new(99999, Tuning::default(), 0);
        let mut state2 = GameState::new(99999, Tuning::default(), 0);
        let inputs = [
            TickInput::default(),
            contacts(vec![ContactEvent::enter(Obstacle, 1)]),
            TickInput {
                jump: true,
                ..Default::default()
            },
            contacts(vec![ContactEvent::enter(Proceed, 2)]),
        ];
        for _ in 0..300 {
            for input in &inputs {
                tick(&mut state1, input, &stage, SIM_DT);
                tick(&mut state2, input, &stage, SIM_DT);
            }
        }
        assert_eq!(state1.drain_events(), state2.drain_events());
        let xs = |s: &GameState| s.scene.actors().iter().map(|a| a.pos).collect::<Vec<_>>();
        assert_eq!(xs(&state1), xs(&state2));
    }

    proptest! {
        #[test]
        fn prop_every_actor_matches_last_broadcast(
            steps in prop::collection::vec(any::<bool>(), 1..120),
        ) {
            let stage = Stage::new();
            let mut tuning = Tuning::default();
            tuning.spawner.min_interval = 0.05;
            tuning.spawner.max_interval = 0.1;
            let mut state = GameState::new(11, tuning, 0);

            for pause in steps {
                let contact = if pause {
                    ContactEvent::enter(Obstacle, 1000)
                } else {
                    ContactEvent::enter(Proceed, 1001)
                };
                tick(&mut state, &contacts(vec![contact]), &stage, 0.0625);

                let paused = state.player.is_paused();
                prop_assert_eq!(state.scene.last_broadcast(), paused);
                prop_assert_eq!(state.scene.spawner.is_paused(), paused);
                for actor in state.scene.actors() {
                    prop_assert_eq!(actor.is_paused(), paused);
                }
            }
        }
    }

    #[test]
    fn test_broadcast_helper_is_idempotent() {
        let mut state = GameState::new(1, Tuning::default(), 0);
        state.spawn_actor(obstacle_spawn());
        state.scene.broadcast_pause(true);
        state.scene.broadcast_pause(true);
        assert!(state.scene.actors().iter().all(|a| a.is_paused()));
    }
}
