//! Skybound entry point
//!
//! Runs the simulation headless with a simple autopilot standing in for the
//! player and a box-overlap host standing in for the physics engine.
//!
//! Usage: `skybound [tuning.json] [seed]`

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use glam::Vec2;

use skybound::audio::{AudioManager, Channel};
use skybound::consts::*;
use skybound::persistence::{JsonFileStore, KeyValueStore, MemoryStore};
use skybound::sim::{
    ActorKind, Bounds, ContactCategory, ContactEvent, GameEvent, GameState, SceneQuery, TickInput,
    tick,
};
use skybound::{ScoreBoard, Settings, Tuning};

const SAVE_FILE: &str = "skybound_save.json";
const FRAME_DT: f32 = 1.0 / 60.0;
const MAX_SECONDS: f32 = 120.0;

const GRAVITY: f32 = 9.8;
const GROUND_Y: f32 = -2.5;
const GROUND_ID: u32 = 0;
const PLAYER_X: f32 = 0.0;
const PLAYER_SIZE: Vec2 = Vec2::new(0.4, 0.4);
const OBSTACLE_SIZE: Vec2 = Vec2::new(0.6, 1.2);

/// Bounds of everything this frame, answered to the simulation as the host
struct Snapshot {
    player: Bounds,
    objects: BTreeMap<u32, (ActorKind, Bounds)>,
}

impl Snapshot {
    fn capture(state: &GameState, player_y: f32) -> Self {
        let objects = state
            .scene
            .actors()
            .iter()
            .map(|a| (a.id, (a.kind, Bounds::from_center(a.pos, OBSTACLE_SIZE))))
            .collect();
        Self {
            player: Bounds::from_center(Vec2::new(PLAYER_X, player_y), PLAYER_SIZE),
            objects,
        }
    }
}

impl SceneQuery for Snapshot {
    fn player_bounds(&self) -> Bounds {
        self.player
    }

    fn bounds_of(&self, object: u32) -> Option<Bounds> {
        self.objects.get(&object).map(|(_, b)| *b)
    }

    fn obstacle_ahead(&self, origin: Vec2, distance: f32) -> bool {
        let ray = Bounds::new(origin, origin + Vec2::new(distance, 0.0));
        self.objects
            .values()
            .any(|(kind, b)| *kind == ActorKind::Obstacle && b.overlaps(&ray))
    }
}

/// Stand-in for the player's rigid body
struct Body {
    y: f32,
    velocity: f32,
    touching: BTreeSet<u32>,
    grounded: bool,
}

impl Body {
    fn new() -> Self {
        Self {
            y: 0.0,
            velocity: 0.0,
            touching: BTreeSet::new(),
            grounded: false,
        }
    }

    fn integrate(&mut self, dt: f32) {
        self.velocity -= GRAVITY * dt;
        self.y += self.velocity * dt;
        if self.y <= GROUND_Y {
            self.y = GROUND_Y;
            self.velocity = self.velocity.max(0.0);
        }
    }

    /// Diff overlaps against the previous frame
    fn contacts(&mut self, snapshot: &Snapshot) -> Vec<ContactEvent> {
        let mut events = Vec::new();

        let on_ground = self.y <= GROUND_Y;
        if on_ground != self.grounded {
            self.grounded = on_ground;
            let event = if on_ground {
                ContactEvent::enter(ContactCategory::Obstacle, GROUND_ID)
            } else {
                ContactEvent::exit(ContactCategory::Obstacle, GROUND_ID)
            };
            events.push(event.ground());
        }

        let now: BTreeSet<u32> = snapshot
            .objects
            .iter()
            .filter(|(_, (_, b))| b.overlaps(&snapshot.player))
            .map(|(&id, _)| id)
            .collect();

        for &id in now.difference(&self.touching) {
            let category = match snapshot.objects.get(&id) {
                Some((ActorKind::SafeObject, _)) => ContactCategory::SafeZone,
                _ => ContactCategory::Obstacle,
            };
            events.push(ContactEvent::enter(category, id));
        }
        for &id in self.touching.difference(&now) {
            events.push(ContactEvent::exit(ContactCategory::Obstacle, id));
        }
        self.touching = now;
        events
    }
}

fn open_store() -> Box<dyn KeyValueStore> {
    match JsonFileStore::open(SAVE_FILE) {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("Save file unavailable ({}), progress will not persist", e);
            Box::new(MemoryStore::new())
        }
    }
}

fn load_tuning(path: Option<&str>) -> Tuning {
    let Some(path) = path else {
        return Tuning::default();
    };
    match Tuning::load(Path::new(path)) {
        Ok(tuning) => tuning,
        Err(e) => {
            log::error!("Bad tuning file {}: {}, using defaults", path, e);
            Tuning::default()
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Skybound (headless) starting...");

    let args: Vec<String> = std::env::args().collect();
    let tuning = load_tuning(args.get(1).map(String::as_str));
    let seed = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(42);

    let mut store = open_store();
    let high_score = match ScoreBoard::load(&*store) {
        Ok(board) => board.high_score,
        Err(e) => {
            log::warn!("Could not read high score: {}", e);
            0
        }
    };

    let settings = Settings::load(&*store);
    let mut audio = AudioManager::default();
    settings.apply_to(&mut audio);
    audio.fade_in(Channel::Music, 2.0, 0.7);
    audio.fade_in(Channel::Ambient, 2.0, 1.0);

    let mut state = GameState::new(seed, tuning, high_score);
    let mut body = Body::new();
    let mut accumulator = 0.0;
    let mut elapsed = 0.0;

    while !state.is_over() && elapsed < MAX_SECONDS {
        accumulator += FRAME_DT;
        elapsed += FRAME_DT;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            body.integrate(SIM_DT);
            let snapshot = Snapshot::capture(&state, body.y);
            let input = TickInput {
                jump: body.y < 0.0 && body.velocity <= 0.0,
                menu_pause: false,
                contacts: body.contacts(&snapshot),
            };
            tick(&mut state, &input, &snapshot, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;

            for event in state.drain_events() {
                match event {
                    GameEvent::Jumped(jump) => {
                        body.velocity = if jump.cleared_force {
                            jump.impulse
                        } else {
                            body.velocity.max(0.0) + jump.impulse
                        };
                        audio.play_flap();
                    }
                    GameEvent::Sound(effect) => {
                        audio.play(effect);
                    }
                    GameEvent::ScaledSound { effect, scale } => {
                        audio.play_scaled(effect, scale);
                    }
                    GameEvent::PauseChanged(paused) => {
                        log::debug!("Level {}", if paused { "paused" } else { "moving" });
                    }
                    GameEvent::CountdownStarted { duration } => {
                        log::info!("Storm in {:.1}s", duration);
                    }
                    GameEvent::GameOver => audio.stop_all(),
                    _ => {}
                }
            }
        }
        audio.update(FRAME_DT);
    }

    log::info!(
        "Finished after {:.1}s: {:?}, score {}, best {}",
        elapsed,
        state.phase,
        state.scores.score,
        state.scores.high_score
    );

    if let Err(e) = state.scores.save(&mut *store) {
        log::error!("Failed to save high score: {}", e);
    }
    if let Err(e) = settings.save(&mut *store) {
        log::error!("Failed to save settings: {}", e);
    }
}
