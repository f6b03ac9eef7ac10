//! Player contact state machine and level pause coordination
//!
//! The player never stops: the level does. Touching an obstacle freezes
//! every scrolling element, and specific contacts (proceed markers, sliding
//! clear of an obstacle, the safe zone) let it move again. The rules are
//! asymmetric:
//!
//! - entering an obstacle pauses, leaving the ground never unpauses
//! - a proceed marker unpauses even while other obstacles are still touching
//! - sliding off the top or bottom of an obstacle unpauses only if the way
//!   ahead is clear

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bounds::{Bounds, classify_departure};
use crate::tuning::PlayerTuning;

/// Tag carried by the object on the other side of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactCategory {
    /// Instant death
    DangerousObstacle,
    /// Solid obstacle, freezes the level
    Obstacle,
    /// Marker that releases the level
    Proceed,
    /// End-of-level shelter from the storm
    SafeZone,
    /// Pushes the level backwards for a moment
    LeftBounceCollider,
    /// Score trigger between obstacles
    Score,
    Untagged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactPhase {
    Enter,
    Exit,
}

/// Contact notification from the host's physics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEvent {
    pub phase: ContactPhase,
    pub category: ContactCategory,
    pub object: u32,
    /// The object is the designated ground marker
    pub is_ground: bool,
}

impl ContactEvent {
    pub fn enter(category: ContactCategory, object: u32) -> Self {
        Self {
            phase: ContactPhase::Enter,
            category,
            object,
            is_ground: false,
        }
    }

    pub fn exit(category: ContactCategory, object: u32) -> Self {
        Self {
            phase: ContactPhase::Exit,
            category,
            object,
            is_ground: false,
        }
    }

    /// Mark this contact as the ground
    pub fn ground(mut self) -> Self {
        self.is_ground = true;
        self
    }
}

/// Spatial queries answered by the host
pub trait SceneQuery {
    fn player_bounds(&self) -> Bounds;
    fn bounds_of(&self, object: u32) -> Option<Bounds>;
    /// Is there an obstacle within `distance` straight ahead of `origin`
    fn obstacle_ahead(&self, origin: Vec2, distance: f32) -> bool;
}

/// Receiver of the controller's level-wide commands
pub trait LevelElements {
    /// Set the pause flag on every pausable element
    fn broadcast_pause(&mut self, paused: bool);
    /// Run every motion element backwards for `duration`
    fn reverse_motion(&mut self, duration: f32);
    /// Push every spawner's next spawn back
    fn delay_spawns(&mut self, seconds: f32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseState {
    Free,
    Paused,
}

/// What a contact meant for the rest of the game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ContactOutcome {
    None,
    /// Dangerous contact, run is lost
    Fatal,
    SafeZoneReached { at: Vec2 },
    Scored { object: u32 },
    Bounced,
}

/// Impulse the host should apply for a jump
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpImpulse {
    pub impulse: f32,
    /// Accumulated force was cleared before applying
    pub cleared_force: bool,
    /// This jump released the level
    pub unpaused: bool,
}

/// Player-side pause coordinator
#[derive(Debug, Clone)]
pub struct PlayerController {
    tuning: PlayerTuning,
    state: PauseState,
    grounded: bool,
    ground: Option<u32>,
    contacts: BTreeSet<u32>,
    bounce_remaining: Option<f32>,
}

impl PlayerController {
    pub fn new(tuning: PlayerTuning) -> Self {
        Self {
            tuning,
            state: PauseState::Free,
            grounded: false,
            ground: None,
            contacts: BTreeSet::new(),
            bounce_remaining: None,
        }
    }

    pub fn state(&self) -> PauseState {
        self.state
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.state == PauseState::Paused
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn contacts(&self) -> impl Iterator<Item = u32> + '_ {
        self.contacts.iter().copied()
    }

    /// Obstacles touching the player, not counting the ground
    pub fn other_contacts(&self) -> usize {
        self.contacts
            .iter()
            .filter(|&&id| Some(id) != self.ground)
            .count()
    }

    pub fn bounce_remaining(&self) -> Option<f32> {
        self.bounce_remaining
    }

    /// Set the state and broadcast it, even if unchanged
    fn apply(&mut self, paused: bool, level: &mut dyn LevelElements) {
        self.state = if paused {
            PauseState::Paused
        } else {
            PauseState::Free
        };
        level.broadcast_pause(paused);
    }

    /// Explicit pause request
    pub fn pause(&mut self, level: &mut dyn LevelElements) {
        if self.is_paused() {
            log::warn!("Pause requested while already paused");
            return;
        }
        self.apply(true, level);
    }

    /// Explicit unpause request
    pub fn unpause(&mut self, level: &mut dyn LevelElements) {
        if !self.is_paused() {
            log::warn!("Unpause requested while not paused");
            return;
        }
        self.apply(false, level);
    }

    pub fn handle_contact(
        &mut self,
        event: &ContactEvent,
        query: &dyn SceneQuery,
        level: &mut dyn LevelElements,
    ) -> ContactOutcome {
        match event.phase {
            ContactPhase::Enter => self.on_enter(event, query, level),
            ContactPhase::Exit => {
                if event.category == ContactCategory::Obstacle {
                    self.on_obstacle_exit(event, query, level);
                }
                ContactOutcome::None
            }
        }
    }

    fn on_enter(
        &mut self,
        event: &ContactEvent,
        query: &dyn SceneQuery,
        level: &mut dyn LevelElements,
    ) -> ContactOutcome {
        match event.category {
            ContactCategory::DangerousObstacle => {
                log::info!("Dangerous contact with {}", event.object);
                ContactOutcome::Fatal
            }
            ContactCategory::Obstacle => {
                self.contacts.insert(event.object);
                if event.is_ground {
                    self.grounded = true;
                    self.ground = Some(event.object);
                }
                if !self.is_paused() {
                    log::debug!("Obstacle {} hit, pausing level", event.object);
                    self.apply(true, level);
                }
                ContactOutcome::None
            }
            ContactCategory::Proceed => {
                log::debug!("Proceeding forward");
                self.apply(false, level);
                ContactOutcome::None
            }
            ContactCategory::SafeZone => {
                self.apply(false, level);
                let at = query
                    .bounds_of(event.object)
                    .unwrap_or_else(|| query.player_bounds())
                    .center();
                ContactOutcome::SafeZoneReached { at }
            }
            ContactCategory::LeftBounceCollider => {
                let duration = self.tuning.bounce_duration;
                if !self.is_paused() {
                    self.apply(true, level);
                }
                level.reverse_motion(duration);
                level.delay_spawns(duration);
                if self.bounce_remaining.is_some() {
                    log::debug!("Bounce restarted");
                }
                self.bounce_remaining = Some(duration);
                ContactOutcome::Bounced
            }
            ContactCategory::Score => ContactOutcome::Scored {
                object: event.object,
            },
            ContactCategory::Untagged => ContactOutcome::None,
        }
    }

    fn on_obstacle_exit(
        &mut self,
        event: &ContactEvent,
        query: &dyn SceneQuery,
        level: &mut dyn LevelElements,
    ) {
        self.contacts.remove(&event.object);

        if event.is_ground || self.ground == Some(event.object) {
            // Lifting off the ground alone never releases the level
            self.grounded = false;
            self.ground = None;
            return;
        }

        if !self.is_paused() {
            return;
        }

        let Some(obstacle) = query.bounds_of(event.object) else {
            log::warn!("No bounds for obstacle {}, keeping level paused", event.object);
            return;
        };
        let player = query.player_bounds();
        let departure = classify_departure(&player, &obstacle, self.tuning.departure_tolerance);
        if !departure.is_vertical() {
            return;
        }

        if !query.obstacle_ahead(player.center(), self.tuning.raycast_distance) {
            log::debug!("Cleared obstacle {} via {:?}, resuming", event.object, departure);
            self.apply(false, level);
        }
    }

    /// Advance the bounce window, releasing the level when it ends
    pub fn tick(&mut self, dt: f32, level: &mut dyn LevelElements) {
        if let Some(remaining) = self.bounce_remaining {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.bounce_remaining = None;
                self.apply(false, level);
            } else {
                self.bounce_remaining = Some(remaining);
            }
        }
    }

    /// Choose the jump impulse.
    ///
    /// Standing on the ground with nothing else in the way, a jump while
    /// paused also releases the level and gets the full impulse.
    pub fn jump(&mut self, level: &mut dyn LevelElements) -> JumpImpulse {
        if !self.is_paused() {
            return JumpImpulse {
                impulse: self.tuning.jump_force,
                cleared_force: false,
                unpaused: false,
            };
        }

        if self.grounded && self.other_contacts() == 0 {
            self.apply(false, level);
            return JumpImpulse {
                impulse: self.tuning.jump_force,
                cleared_force: false,
                unpaused: true,
            };
        }

        JumpImpulse {
            impulse: self.tuning.paused_jump_force,
            cleared_force: true,
            unpaused: false,
        }
    }

    /// Forget contacts and timers for a fresh level
    pub fn reset(&mut self) {
        self.state = PauseState::Free;
        self.grounded = false;
        self.ground = None;
        self.contacts.clear();
        self.bounce_remaining = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Recorder {
        pauses: Vec<bool>,
        reversals: Vec<f32>,
        delays: Vec<f32>,
    }

    impl LevelElements for Recorder {
        fn broadcast_pause(&mut self, paused: bool) {
            self.pauses.push(paused);
        }
        fn reverse_motion(&mut self, duration: f32) {
            self.reversals.push(duration);
        }
        fn delay_spawns(&mut self, seconds: f32) {
            self.delays.push(seconds);
        }
    }

    struct Scene {
        player: Bounds,
        objects: HashMap<u32, Bounds>,
        blocked_ahead: bool,
    }

    impl Scene {
        fn new() -> Self {
            Self {
                player: Bounds::from_center(Vec2::ZERO, Vec2::splat(0.5)),
                objects: HashMap::new(),
                blocked_ahead: false,
            }
        }
    }

    impl SceneQuery for Scene {
        fn player_bounds(&self) -> Bounds {
            self.player
        }
        fn bounds_of(&self, object: u32) -> Option<Bounds> {
            self.objects.get(&object).copied()
        }
        fn obstacle_ahead(&self, _origin: Vec2, _distance: f32) -> bool {
            self.blocked_ahead
        }
    }

    use ContactCategory::*;

    #[test]
    fn test_obstacle_pauses_once() {
        let scene = Scene::new();
        let mut level = Recorder::default();
        let mut player = PlayerController::new(PlayerTuning::default());

        player.handle_contact(&ContactEvent::enter(Obstacle, 1), &scene, &mut level);
        player.handle_contact(&ContactEvent::enter(Obstacle, 2), &scene, &mut level);
        assert!(player.is_paused());
        assert_eq!(level.pauses, vec![true]);
        assert_eq!(player.other_contacts(), 2);
    }

    #[test]
    fn test_dangerous_is_fatal_regardless_of_pause() {
        let scene = Scene::new();
        let mut level = Recorder::default();
        let mut player = PlayerController::new(PlayerTuning::default());
        player.handle_contact(&ContactEvent::enter(Obstacle, 1), &scene, &mut level);
        let outcome =
            player.handle_contact(&ContactEvent::enter(DangerousObstacle, 2), &scene, &mut level);
        assert_eq!(outcome, ContactOutcome::Fatal);
    }

    #[test]
    fn test_proceed_overrides_remaining_contacts() {
        let scene = Scene::new();
        let mut level = Recorder::default();
        let mut player = PlayerController::new(PlayerTuning::default());
        player.handle_contact(&ContactEvent::enter(Obstacle, 1), &scene, &mut level);
        player.handle_contact(&ContactEvent::enter(Proceed, 9), &scene, &mut level);
        assert!(!player.is_paused());
        assert_eq!(player.other_contacts(), 1);
        assert_eq!(level.pauses, vec![true, false]);
    }

    #[test]
    fn test_leaving_ground_does_not_unpause() {
        let scene = Scene::new();
        let mut level = Recorder::default();
        let mut player = PlayerController::new(PlayerTuning::default());
        player.handle_contact(&ContactEvent::enter(Obstacle, 1).ground(), &scene, &mut level);
        assert!(player.is_grounded());
        player.handle_contact(&ContactEvent::exit(Obstacle, 1).ground(), &scene, &mut level);
        assert!(!player.is_grounded());
        assert!(player.is_paused());
    }

    #[test]
    fn test_sliding_off_top_with_clear_path_unpauses() {
        let mut scene = Scene::new();
        scene.objects.insert(
            5,
            Bounds::new(Vec2::new(-0.5, -2.0), Vec2::new(0.5, -0.25)),
        );
        let mut level = Recorder::default();
        let mut player = PlayerController::new(PlayerTuning::default());
        player.handle_contact(&ContactEvent::enter(Obstacle, 5), &scene, &mut level);
        player.handle_contact(&ContactEvent::exit(Obstacle, 5), &scene, &mut level);
        assert!(!player.is_paused());
    }

    #[test]
    fn test_sliding_off_top_with_blocked_path_stays_paused() {
        let mut scene = Scene::new();
        scene.blocked_ahead = true;
        scene.objects.insert(
            5,
            Bounds::new(Vec2::new(-0.5, -2.0), Vec2::new(0.5, -0.25)),
        );
        let mut level = Recorder::default();
        let mut player = PlayerController::new(PlayerTuning::default());
        player.handle_contact(&ContactEvent::enter(Obstacle, 5), &scene, &mut level);
        player.handle_contact(&ContactEvent::exit(Obstacle, 5), &scene, &mut level);
        assert!(player.is_paused());
    }

    #[test]
    fn test_side_exit_stays_paused() {
        let mut scene = Scene::new();
        scene.objects.insert(5, Bounds::new(Vec2::new(0.25, -2.0), Vec2::new(1.0, 2.0)));
        let mut level = Recorder::default();
        let mut player = PlayerController::new(PlayerTuning::default());
        player.handle_contact(&ContactEvent::enter(Obstacle, 5), &scene, &mut level);
        player.handle_contact(&ContactEvent::exit(Obstacle, 5), &scene, &mut level);
        assert!(player.is_paused());
        assert_eq!(player.other_contacts(), 0);
    }

    #[test]
    fn test_safe_zone_unpauses_and_reports_location() {
        let mut scene = Scene::new();
        scene.objects.insert(7, Bounds::from_center(Vec2::new(4.0, 1.0), Vec2::ONE));
        let mut level = Recorder::default();
        let mut player = PlayerController::new(PlayerTuning::default());
        player.handle_contact(&ContactEvent::enter(Obstacle, 1), &scene, &mut level);
        let outcome = player.handle_contact(&ContactEvent::enter(SafeZone, 7), &scene, &mut level);
        assert_eq!(
            outcome,
            ContactOutcome::SafeZoneReached {
                at: Vec2::new(4.0, 1.0)
            }
        );
        assert!(!player.is_paused());
    }

    #[test]
    fn test_bounce_pauses_reverses_and_releases() {
        let scene = Scene::new();
        let mut level = Recorder::default();
        let mut player = PlayerController::new(PlayerTuning::default());
        let outcome =
            player.handle_contact(&ContactEvent::enter(LeftBounceCollider, 3), &scene, &mut level);
        assert_eq!(outcome, ContactOutcome::Bounced);
        assert!(player.is_paused());
        assert_eq!(level.reversals, vec![0.25]);
        assert_eq!(level.delays, vec![0.25]);

        for _ in 0..3 {
            player.tick(0.0625, &mut level);
            assert!(player.is_paused());
        }
        player.tick(0.0625, &mut level);
        assert!(!player.is_paused());
        assert_eq!(player.bounce_remaining(), None);
    }

    #[test]
    fn test_second_bounce_restarts_window() {
        let scene = Scene::new();
        let mut level = Recorder::default();
        let mut player = PlayerController::new(PlayerTuning::default());
        player.handle_contact(&ContactEvent::enter(LeftBounceCollider, 3), &scene, &mut level);
        player.tick(0.125, &mut level);
        player.handle_contact(&ContactEvent::enter(LeftBounceCollider, 3), &scene, &mut level);
        assert_eq!(player.bounce_remaining(), Some(0.25));
        assert_eq!(level.reversals, vec![0.25, 0.25]);
    }

    #[test]
    fn test_jump_free_uses_full_impulse() {
        let mut level = Recorder::default();
        let mut player = PlayerController::new(PlayerTuning::default());
        let jump = player.jump(&mut level);
        assert_eq!(jump.impulse, 5.0);
        assert!(!jump.unpaused);
        assert!(level.pauses.is_empty());
    }

    #[test]
    fn test_jump_paused_in_air_uses_reduced_impulse() {
        let scene = Scene::new();
        let mut level = Recorder::default();
        let mut player = PlayerController::new(PlayerTuning::default());
        player.handle_contact(&ContactEvent::enter(Obstacle, 1), &scene, &mut level);
        let jump = player.jump(&mut level);
        assert_eq!(jump.impulse, 2.0);
        assert!(jump.cleared_force);
        assert!(player.is_paused());
    }

    #[test]
    fn test_jump_paused_on_bare_ground_releases_level() {
        let scene = Scene::new();
        let mut level = Recorder::default();
        let mut player = PlayerController::new(PlayerTuning::default());
        player.handle_contact(&ContactEvent::enter(Obstacle, 1).ground(), &scene, &mut level);
        assert!(player.is_paused());

        let jump = player.jump(&mut level);
        assert!(jump.unpaused);
        assert_eq!(jump.impulse, 5.0);
        assert!(!player.is_paused());
        assert_eq!(level.pauses, vec![true, false]);
    }

    #[test]
    fn test_jump_paused_on_ground_against_obstacle_stays_paused() {
        let scene = Scene::new();
        let mut level = Recorder::default();
        let mut player = PlayerController::new(PlayerTuning::default());
        player.handle_contact(&ContactEvent::enter(Obstacle, 1).ground(), &scene, &mut level);
        player.handle_contact(&ContactEvent::enter(Obstacle, 2), &scene, &mut level);
        let jump = player.jump(&mut level);
        assert!(!jump.unpaused);
        assert_eq!(jump.impulse, 2.0);
        assert!(player.is_paused());
    }

    #[test]
    fn test_redundant_explicit_requests_are_noops() {
        let mut level = Recorder::default();
        let mut player = PlayerController::new(PlayerTuning::default());
        player.unpause(&mut level);
        player.pause(&mut level);
        player.pause(&mut level);
        assert_eq!(level.pauses, vec![true]);
    }
}
