//! Axis-aligned bounds supplied by the host's physics
//!
//! Used to work out which way the player left an obstacle: sliding off the
//! top or bottom lets the level resume, backing out of the side does not.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Which face of an obstacle the player left through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Departure {
    Top,
    Bottom,
    Side,
}

impl Departure {
    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Departure::Top | Departure::Bottom)
    }
}

/// Compare extents at the moment contact ended
pub fn classify_departure(player: &Bounds, obstacle: &Bounds, tolerance: f32) -> Departure {
    if player.min.y >= obstacle.max.y - tolerance {
        Departure::Top
    } else if player.max.y <= obstacle.min.y + tolerance {
        Departure::Bottom
    } else {
        Departure::Side
    }
}
