//! Skybound - an endless side-scrolling flight game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pause coordination, spawning, storm countdown)
//! - `audio`: Volume math and pooled sound-effect voices
//! - `persistence`: Key-value storage for the high score and settings
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, PersistError};
pub use highscores::ScoreBoard;
pub use settings::Settings;
pub use tuning::Tuning;

use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Overlap between background panels when one wraps, hides the seam
    pub const SEAM_OVERLAP: f32 = 0.1;

    /// Delay between the thunder clap and the first bolt flash
    pub const STRIKE_LEAD_TIME: f32 = 0.05;

    /// A fading channel that ends at or below this volume is stopped
    pub const FADE_STOP_THRESHOLD: f32 = 0.01;

    /// Key-value store keys
    pub const HIGH_SCORE_KEY: &str = "HighScore";
    pub const SETTINGS_KEY: &str = "skybound_settings";
}

/// Uniform draw from `[min, max]`, or `min` when the range is empty
#[inline]
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..=max)
    } else {
        min
    }
}

/// Uniform integer draw from `[min, max]` inclusive, or `min` when the range is empty
#[inline]
pub fn random_count<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    if max > min {
        rng.random_range(min..=max)
    } else {
        min
    }
}
