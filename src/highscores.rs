//! Score and persisted high score
//!
//! Only the single best score is kept, under the `HighScore` key.

use serde::{Deserialize, Serialize};

use crate::consts::HIGH_SCORE_KEY;
use crate::error::PersistError;
use crate::persistence::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub score: u32,
    pub high_score: u32,
}

impl ScoreBoard {
    pub fn new(high_score: u32) -> Self {
        Self {
            score: 0,
            high_score,
        }
    }

    /// Load the high score, treating a missing key as zero
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, PersistError> {
        let high_score = store
            .get_int(HIGH_SCORE_KEY)?
            .map(|v| v.clamp(0, u32::MAX as i64) as u32)
            .unwrap_or(0);
        log::info!("Loaded high score {}", high_score);
        Ok(Self::new(high_score))
    }

    /// Add a point, returns true if this beat the high score
    pub fn increment(&mut self) -> bool {
        self.score += 1;
        if self.score > self.high_score {
            self.high_score = self.score;
            true
        } else {
            false
        }
    }

    /// Clear the current score for a new run
    pub fn reset(&mut self) {
        self.score = 0;
    }

    /// Persist the high score if the stored one is lower
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<bool, PersistError> {
        let stored = store.get_int(HIGH_SCORE_KEY).ok().flatten().unwrap_or(0);
        if i64::from(self.high_score) <= stored {
            return Ok(false);
        }
        store.set_int(HIGH_SCORE_KEY, i64::from(self.high_score))?;
        log::info!("High score saved ({})", self.high_score);
        Ok(true)
    }
}
