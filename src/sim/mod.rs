//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio output or physics; the host answers `SceneQuery`

pub mod actor;
pub mod bounds;
pub mod contact;
pub mod hazard;
pub mod motion;
pub mod progress;
pub mod scene;
pub mod scenery;
pub mod spawner;
pub mod state;
pub mod strike;
pub mod tick;

pub use actor::{Actor, ActorFate, ActorKind, Lifetime};
pub use bounds::{Bounds, Departure, classify_departure};
pub use contact::{
    ContactCategory, ContactEvent, ContactOutcome, ContactPhase, JumpImpulse, LevelElements,
    PauseState, PlayerController, SceneQuery,
};
pub use hazard::{CountdownState, HazardEvent, HazardPhase, HazardSequencer, Outcome};
pub use motion::{Motion, Pausable};
pub use progress::ProgressCounter;
pub use scene::{Removal, Scene};
pub use scenery::{Cloud, CloudField, Scroller};
pub use spawner::{Spawn, Spawner};
pub use state::{GameEvent, GamePhase, GameState};
pub use strike::{Bolt, StrikeEvent, StrikeSequence};
pub use tick::{TickInput, tick};
