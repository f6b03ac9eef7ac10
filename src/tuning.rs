//! Data-driven game balance
//!
//! Every knob the level exposes lives here. Missing JSON fields fall back to
//! the shipped defaults, and `validate` rejects values that would break the
//! timers (inverted ranges, zero intervals, fractions outside [0, 1]).

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Complete tuning set for one level
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub spawner: SpawnerTuning,
    pub hazard: HazardTuning,
    pub strike: StrikeTuning,
    pub scenery: SceneryTuning,
    pub clouds: CloudTuning,
}

/// Player controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Upward impulse for a normal jump
    pub jump_force: f32,
    /// Smaller impulse used while the level is paused
    pub paused_jump_force: f32,
    /// How long a bounce collider reverses the level
    pub bounce_duration: f32,
    /// Forward look-ahead when sliding off the top or bottom of an obstacle
    pub raycast_distance: f32,
    /// Slack when comparing bounding extents for departure direction
    pub departure_tolerance: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            jump_force: 5.0,
            paused_jump_force: 2.0,
            bounce_duration: 0.25,
            raycast_distance: 1.0,
            departure_tolerance: 0.05,
        }
    }
}

/// Obstacle spawner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerTuning {
    /// Spawn anchor (right of the screen)
    pub anchor: Vec2,
    pub min_interval: f32,
    pub max_interval: f32,
    /// Vertical jitter around the anchor
    pub height_range: f32,
    /// Leftward speed given to spawned obstacles
    pub object_speed: f32,
    /// Seconds until a spawned obstacle self-destructs
    pub lifetime: f32,
    /// Prefab names picked at random for ordinary spawns
    pub prefabs: Vec<String>,
    pub safe_prefab: Option<String>,
    pub safe_y_offset: f32,
    /// Objects left of this x are culled
    pub despawn_x: f32,
}

impl Default for SpawnerTuning {
    fn default() -> Self {
        Self {
            anchor: Vec2::new(3.0, 0.0),
            min_interval: 1.2,
            max_interval: 1.8,
            height_range: 0.45,
            object_speed: 0.65,
            lifetime: 10.0,
            prefabs: vec!["Pipe".to_string()],
            safe_prefab: Some("SafeZone".to_string()),
            safe_y_offset: 0.0,
            despawn_x: -20.0,
        }
    }
}

/// Storm countdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    /// Wait before the opening lightning strike
    pub initial_strike_delay: f32,
    pub min_countdown: f32,
    pub max_countdown: f32,
    /// Window before expiry in which the safe object may appear
    pub spawn_buffer: f32,
    /// Fraction of the estimated obstacles that must be passed first
    pub required_pass_fraction: f32,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            initial_strike_delay: 5.0,
            min_countdown: 10.0,
            max_countdown: 20.0,
            spawn_buffer: 5.0,
            required_pass_fraction: 0.7,
        }
    }
}

/// Lightning strike presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikeTuning {
    /// Vertical offset of the effect anchor from the target
    pub y_offset: f32,
    pub min_flicker: u32,
    pub max_flicker: u32,
    pub flicker_on: f32,
    pub min_flicker_off: f32,
    pub max_flicker_off: f32,
    /// Approximate budgets; the flicker schedule is not clipped to them
    pub initial_duration: f32,
    pub player_duration: f32,
    pub safe_zone_duration: f32,
    /// Number of bolt visuals that can strike the player
    pub player_bolt_count: usize,
    pub thunder_volume: f32,
}

impl Default for StrikeTuning {
    fn default() -> Self {
        Self {
            y_offset: 0.0,
            min_flicker: 2,
            max_flicker: 4,
            flicker_on: 0.08,
            min_flicker_off: 0.05,
            max_flicker_off: 0.15,
            initial_duration: 0.5,
            player_duration: 0.5,
            safe_zone_duration: 0.5,
            player_bolt_count: 3,
            thunder_volume: 1.0,
        }
    }
}

/// Background scroller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneryTuning {
    pub scroll_speed: f32,
    pub panel_width: f32,
}

impl Default for SceneryTuning {
    fn default() -> Self {
        Self {
            scroll_speed: 0.15,
            panel_width: 6.0,
        }
    }
}

/// Parallax clouds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudTuning {
    /// Number of cloud visuals to pick from
    pub variants: usize,
    pub min_delay: f32,
    pub max_delay: f32,
    pub anchor: Vec2,
    pub x_offset: f32,
    pub min_y_offset: f32,
    pub max_y_offset: f32,
    pub base_speed: f32,
    /// Speed multiplier while the level is moving
    pub fast_multiplier: f32,
    pub despawn_x: f32,
}

impl Default for CloudTuning {
    fn default() -> Self {
        Self {
            variants: 3,
            min_delay: 3.0,
            max_delay: 7.0,
            anchor: Vec2::ZERO,
            x_offset: 20.0,
            min_y_offset: -2.0,
            max_y_offset: 2.0,
            base_speed: 1.0,
            fast_multiplier: 1.5,
            despawn_x: -20.0,
        }
    }
}

fn check_range(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedRange { field, min, max });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

fn check_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfUnitRange { field, value });
    }
    Ok(())
}

impl Tuning {
    /// Parse and validate tuning from JSON text
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the timers cannot run with.
    ///
    /// An empty prefab list is not rejected here: the spawner disables
    /// itself instead so the rest of the level keeps running.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.spawner;
        check_positive("spawner.min_interval", s.min_interval)?;
        check_range("spawner.interval", s.min_interval, s.max_interval)?;
        check_positive("spawner.lifetime", s.lifetime)?;
        if s.height_range < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "spawner.height_range",
                value: s.height_range,
            });
        }

        let h = &self.hazard;
        check_positive("hazard.min_countdown", h.min_countdown)?;
        check_range("hazard.countdown", h.min_countdown, h.max_countdown)?;
        check_unit("hazard.required_pass_fraction", h.required_pass_fraction)?;

        let k = &self.strike;
        check_range(
            "strike.flicker",
            k.min_flicker as f32,
            k.max_flicker as f32,
        )?;
        check_range("strike.flicker_off", k.min_flicker_off, k.max_flicker_off)?;
        check_unit("strike.thunder_volume", k.thunder_volume)?;

        check_positive("player.bounce_duration", self.player.bounce_duration)?;
        check_positive("scenery.panel_width", self.scenery.panel_width)?;

        let c = &self.clouds;
        check_range("clouds.delay", c.min_delay, c.max_delay)?;
        check_range("clouds.y_offset", c.min_y_offset, c.max_y_offset)?;

        Ok(())
    }
}
